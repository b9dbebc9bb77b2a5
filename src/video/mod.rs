mod manager;
mod retry;
mod state;
mod tavus;
mod types;

use crate::config::VideoConfig;
pub use manager::{VideoSessionManager, room_error_message, start_error_message};
pub use retry::{JoinAction, next_join_action};
pub use state::{SessionEvent, SessionState};
use std::sync::Arc;
pub use tavus::{PERSONA_NAME, Persona, TavusClient};
use tracing::warn;
pub use types::{
    CallFrame, ConversationApi, ConversationSession, CreatedConversation, MediaConstraints,
    MediaDevices, MediaStream, RoomEvent, RoomHost, SessionStatus,
};

/// Builds a manager backed by the hosted conversation API. When credentials
/// are missing the manager still exists and every `start()` lands in the
/// disabled error state.
pub fn create_manager(
    config: &VideoConfig,
    devices: Arc<dyn MediaDevices>,
    host: Arc<dyn RoomHost>,
) -> VideoSessionManager {
    let api: Arc<dyn ConversationApi> = match TavusClient::from_config(config) {
        Some(client) => Arc::new(client),
        None => {
            warn!(
                "Video calls disabled, missing: {}",
                config.missing_credentials().join(", ")
            );
            Arc::new(Unconfigured)
        }
    };
    VideoSessionManager::new(config, devices, api, host)
}

struct Unconfigured;

#[async_trait::async_trait]
impl ConversationApi for Unconfigured {
    async fn create_conversation(&self) -> crate::error::Result<CreatedConversation> {
        Err(crate::error::MaternaError::Config(
            "Video API is not configured".to_string(),
        ))
    }

    async fn end_conversation(&self, _conversation_id: &str) -> crate::error::Result<()> {
        Ok(())
    }
}

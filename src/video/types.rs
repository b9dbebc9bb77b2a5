use crate::error::{MaternaError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Created,
    Joining,
    Active,
    Ended,
}

/// The remote conversation backing the current call.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSession {
    pub session_id: String,
    pub room_url: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedConversation {
    #[serde(rename = "conversation_id")]
    pub id: String,
    #[serde(rename = "conversation_url")]
    pub room_url: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Preferred capture settings for the local camera and microphone.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
    pub front_camera: bool,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            front_camera: true,
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Events raised by the embedded room, reduced to transition triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    Joined,
    LeftMeeting,
    Error(String),
    CameraError(String),
}

#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Fails with `PermissionDenied` or `DeviceNotFound`.
    async fn acquire(&self, constraints: &MediaConstraints) -> Result<Arc<dyn MediaStream>>;
}

/// Local camera and microphone tracks. `None` means the track is absent.
pub trait MediaStream: Send + Sync {
    fn audio_enabled(&self) -> Option<bool>;
    fn set_audio_enabled(&self, enabled: bool) -> Result<()>;
    fn video_enabled(&self) -> Option<bool>;
    fn set_video_enabled(&self, enabled: bool) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

#[async_trait]
pub trait ConversationApi: Send + Sync {
    async fn create_conversation(&self) -> Result<CreatedConversation>;
    async fn end_conversation(&self, conversation_id: &str) -> Result<()>;
}

/// The single container the remote room is embedded in.
#[async_trait]
pub trait RoomHost: Send + Sync {
    async fn create_frame(&self) -> Result<Arc<dyn CallFrame>>;
    fn clear_container(&self) -> Result<()>;
}

#[async_trait]
pub trait CallFrame: Send + Sync {
    async fn join(&self, room_url: &str, user_name: &str) -> Result<()>;
    async fn leave(&self) -> Result<()>;
    async fn destroy(&self) -> Result<()>;

    /// Local microphone state as the room sees it, if the room exposes it.
    fn local_audio(&self) -> Option<bool> {
        None
    }

    fn set_local_audio(&self, _enabled: bool) -> Result<()> {
        Err(MaternaError::Playback(
            "Room does not expose audio controls".to_string(),
        ))
    }

    fn local_video(&self) -> Option<bool> {
        None
    }

    fn set_local_video(&self, _enabled: bool) -> Result<()> {
        Err(MaternaError::Playback(
            "Room does not expose video controls".to_string(),
        ))
    }
}

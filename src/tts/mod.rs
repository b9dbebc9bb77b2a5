mod command;
mod elevenlabs;
mod orchestrator;
mod types;
mod voice;

use crate::config::TtsConfig;
pub use command::{CommandPlayer, CommandSpeaker, ProcessHandle};
pub use elevenlabs::{AFFIRMATIONS_VOICE, ElevenLabsClient, RemoteVoice, TIPS_VOICE};
pub use orchestrator::{BOTH_BACKENDS_FAILED, SpeechOrchestrator};
use std::sync::Arc;
use tracing::info;
pub use types::{
    AudioOutput, ContentCategory, Gender, LocalSynthesizer, PlaybackHandle, RemoteSynthesizer,
    SpeechOptions, SpeechRequest, SynthesisMode, UtteranceParams, VoiceInfo, VoiceSettings,
};
pub use voice::select_voice;

pub fn create_orchestrator(config: &TtsConfig) -> SpeechOrchestrator {
    let remote: Option<Arc<dyn RemoteSynthesizer>> = match ElevenLabsClient::from_config(config) {
        Some(client) => Some(Arc::new(client)),
        None => {
            info!("No remote speech API key configured, using on-device speech only");
            None
        }
    };

    SpeechOrchestrator::new(
        remote,
        Arc::new(CommandPlayer::new(&config.player_command)),
        Arc::new(CommandSpeaker::new(&config.speaker_command)),
        config.max_text_len,
    )
}

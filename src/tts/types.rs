use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of content being read aloud; picks voice and delivery defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    #[default]
    Affirmations,
    Tips,
}

/// Which backend is serving speech for the session. `Fallback` is sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceParams {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voice: Option<String>,
}

impl ContentCategory {
    pub fn voice_settings(&self) -> VoiceSettings {
        match self {
            Self::Affirmations => VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.8,
                style: 0.2,
                use_speaker_boost: true,
            },
            Self::Tips => VoiceSettings {
                stability: 0.7,
                similarity_boost: 0.7,
                style: 0.1,
                use_speaker_boost: false,
            },
        }
    }

    /// Affirmations are read slower and slightly higher.
    pub fn utterance_params(&self) -> UtteranceParams {
        let (rate, pitch) = match self {
            Self::Affirmations => (0.8, 1.1),
            Self::Tips => (0.9, 1.0),
        };
        UtteranceParams {
            rate,
            pitch,
            volume: 0.9,
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeechOptions {
    pub voice_profile: Option<String>,
    pub category: ContentCategory,
}

impl SpeechOptions {
    pub fn new(category: ContentCategory) -> Self {
        Self {
            voice_profile: None,
            category,
        }
    }

    pub fn with_voice(mut self, voice_profile: impl Into<String>) -> Self {
        self.voice_profile = Some(voice_profile.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_profile: Option<String>,
    pub category: ContentCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub gender: Option<Gender>,
    pub is_default: bool,
}

/// Paid remote voice API.
#[async_trait]
pub trait RemoteSynthesizer: Send + Sync {
    /// Returns encoded audio. An empty buffer counts as a failure upstream.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}

/// Plays an encoded audio buffer produced by the remote path.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn play(&self, audio: Vec<u8>) -> Result<Box<dyn PlaybackHandle>>;
}

/// On-device speech engine used as the fallback path.
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    fn is_supported(&self) -> bool {
        true
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    async fn speak(&self, text: &str, params: &UtteranceParams) -> Result<Box<dyn PlaybackHandle>>;
}

/// A single in-flight utterance or audio clip.
#[async_trait]
pub trait PlaybackHandle: Send {
    async fn stop(&mut self) -> Result<()>;
    async fn pause(&mut self) -> Result<()>;
    async fn resume(&mut self) -> Result<()>;
    fn is_finished(&mut self) -> bool;
}

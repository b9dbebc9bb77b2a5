use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TTS_URL: &str = "https://api.elevenlabs.io";
const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_MAX_TEXT_LEN: usize = 2000;
const DEFAULT_VIDEO_URL: &str = "https://tavusapi.com";
const DEFAULT_JOIN_ATTEMPTS: u32 = 3;
const DEFAULT_JOIN_BACKOFF_MS: u64 = 2000;
const DEFAULT_END_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4";
const DEFAULT_CHARACTER: &str = "Maya";

const PLACEHOLDER_VIDEO_KEY: &str = "your_tavus_api_key_here";
const PLACEHOLDER_REPLICA: &str = "your_replica_id_here";

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    storage: StorageSection,
    #[serde(default)]
    tts: TtsSection,
    #[serde(default)]
    video: VideoSection,
    #[serde(default)]
    assistant: AssistantSection,
}

#[derive(Debug, Clone, Deserialize)]
struct StorageSection {
    data_dir: String,
    database_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TtsSection {
    api_key: Option<String>,
    base_url: Option<String>,
    model_id: Option<String>,
    max_text_len: Option<usize>,
    affirmations_voice: Option<String>,
    tips_voice: Option<String>,
    speaker_command: Option<String>,
    player_command: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct VideoSection {
    api_key: Option<String>,
    replica_id: Option<String>,
    base_url: Option<String>,
    join_attempts: Option<u32>,
    join_backoff_ms: Option<u64>,
    end_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AssistantSection {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    character_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_id: String,
    pub max_text_len: usize,
    pub affirmations_voice: Option<String>,
    pub tips_voice: Option<String>,
    pub speaker_command: String,
    pub player_command: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_TTS_URL.to_string(),
            model_id: DEFAULT_TTS_MODEL.to_string(),
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            affirmations_voice: None,
            tips_voice: None,
            speaker_command: "espeak-ng".to_string(),
            player_command: "mpg123 -q -".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub api_key: Option<String>,
    pub replica_id: Option<String>,
    pub base_url: String,
    pub join_attempts: u32,
    pub join_backoff: Duration,
    /// Upper bound on the best-effort remote end-call during teardown.
    pub end_timeout: Duration,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            replica_id: None,
            base_url: DEFAULT_VIDEO_URL.to_string(),
            join_attempts: DEFAULT_JOIN_ATTEMPTS,
            join_backoff: Duration::from_millis(DEFAULT_JOIN_BACKOFF_MS),
            end_timeout: Duration::from_millis(DEFAULT_END_TIMEOUT_MS),
        }
    }
}

impl VideoConfig {
    /// Names of the credentials that are absent or still hold placeholder values.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !is_set(&self.api_key, PLACEHOLDER_VIDEO_KEY) {
            missing.push("TAVUS_API_KEY");
        }
        if !is_set(&self.replica_id, PLACEHOLDER_REPLICA) {
            missing.push("TAVUS_REPLICA_ID");
        }
        missing
    }

    pub fn is_configured(&self) -> bool {
        self.missing_credentials().is_empty()
    }
}

fn is_set(value: &Option<String>, placeholder: &str) -> bool {
    value
        .as_deref()
        .map(|v| !v.trim().is_empty() && v != placeholder)
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub character_name: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_ASSISTANT_MODEL.to_string(),
            character_name: DEFAULT_CHARACTER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub database_url: String,
    pub tts: TtsConfig,
    pub video: VideoConfig,
    pub assistant: AssistantConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("Failed to parse config file")?;

        let data_dir: PathBuf = file.storage.data_dir.into();
        let database_url = file.storage.database_url.unwrap_or_else(|| {
            format!("sqlite:{}?mode=rwc", data_dir.join("materna.db").display())
        });

        let tts_defaults = TtsConfig::default();
        let video_defaults = VideoConfig::default();
        let assistant_defaults = AssistantConfig::default();

        Ok(Self {
            data_dir,
            database_url,
            tts: TtsConfig {
                api_key: file.tts.api_key.filter(|k| !k.trim().is_empty()),
                base_url: file.tts.base_url.unwrap_or(tts_defaults.base_url),
                model_id: file.tts.model_id.unwrap_or(tts_defaults.model_id),
                max_text_len: file.tts.max_text_len.unwrap_or(tts_defaults.max_text_len),
                affirmations_voice: file.tts.affirmations_voice,
                tips_voice: file.tts.tips_voice,
                speaker_command: file
                    .tts
                    .speaker_command
                    .unwrap_or(tts_defaults.speaker_command),
                player_command: file
                    .tts
                    .player_command
                    .unwrap_or(tts_defaults.player_command),
            },
            video: VideoConfig {
                api_key: file.video.api_key,
                replica_id: file.video.replica_id,
                base_url: file.video.base_url.unwrap_or(video_defaults.base_url),
                join_attempts: file
                    .video
                    .join_attempts
                    .unwrap_or(video_defaults.join_attempts)
                    .max(1),
                join_backoff: file
                    .video
                    .join_backoff_ms
                    .map(Duration::from_millis)
                    .unwrap_or(video_defaults.join_backoff),
                end_timeout: file
                    .video
                    .end_timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(video_defaults.end_timeout),
            },
            assistant: AssistantConfig {
                api_key: file.assistant.api_key.filter(|k| !k.trim().is_empty()),
                base_url: file.assistant.base_url,
                model: file.assistant.model.unwrap_or(assistant_defaults.model),
                character_name: file
                    .assistant
                    .character_name
                    .unwrap_or(assistant_defaults.character_name),
            },
        })
    }

    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }
}

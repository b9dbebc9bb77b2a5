use super::types::{ContentCategory, RemoteSynthesizer, SpeechRequest};
use crate::config::TtsConfig;
use crate::error::{MaternaError, RemoteReason, Result};
use crate::utils::remote_error_message;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

/// Soothing female voice.
pub const AFFIRMATIONS_VOICE: &str = "EXAVITQu4vr4xnSDxMaL";
/// Clear, informative male voice.
pub const TIPS_VOICE: &str = "pNInz6obpgDQGcFmaJgB";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model_id: String,
    affirmations_voice: String,
    tips_voice: String,
}

#[derive(Deserialize)]
struct WrappedAudio {
    audio: String,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<RemoteVoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteVoice {
    pub voice_id: String,
    pub name: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, config: &TtsConfig) -> Self {
        info!(
            "ElevenLabs speech client initialized (model: {})",
            config.model_id
        );
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            affirmations_voice: config
                .affirmations_voice
                .clone()
                .unwrap_or_else(|| AFFIRMATIONS_VOICE.to_string()),
            tips_voice: config
                .tips_voice
                .clone()
                .unwrap_or_else(|| TIPS_VOICE.to_string()),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &TtsConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .map(|key| Self::new(key, config))
    }

    fn voice_for<'a>(&'a self, request: &'a SpeechRequest) -> &'a str {
        match (&request.voice_profile, request.category) {
            (Some(voice), _) => voice.as_str(),
            (None, ContentCategory::Affirmations) => self.affirmations_voice.as_str(),
            (None, ContentCategory::Tips) => self.tips_voice.as_str(),
        }
    }

    pub async fn list_voices(&self) -> Result<Vec<RemoteVoice>> {
        let resp = self
            .client
            .get(format!("{}/v1/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MaternaError::remote(
                status,
                remote_error_message(&body, "Failed to list voices"),
            ));
        }

        let data: VoicesResponse = resp.json().await?;
        Ok(data.voices)
    }
}

#[async_trait]
impl RemoteSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let voice_id = self.voice_for(request);
        let settings = request.category.voice_settings();
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);

        let body = json!({
            "text": request.text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": settings.stability,
                "similarity_boost": settings.similarity_boost,
                "style": settings.style,
                "use_speaker_boost": settings.use_speaker_boost,
            }
        });

        let resp = self
            .client
            .post(&url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(MaternaError::remote(
                status,
                remote_error_message(&body, "Failed to generate speech"),
            ));
        }

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let audio = if is_json {
            let wrapped: WrappedAudio = resp.json().await?;
            STANDARD
                .decode(wrapped.audio.trim())
                .map_err(|e| MaternaError::RemoteApi {
                    reason: RemoteReason::Other,
                    message: format!("Invalid base64 audio: {}", e),
                })?
        } else {
            resp.bytes().await?.to_vec()
        };

        if audio.is_empty() {
            return Err(MaternaError::RemoteApi {
                reason: RemoteReason::Other,
                message: "Empty audio payload".to_string(),
            });
        }

        debug!("Synthesized {} bytes with voice {}", audio.len(), voice_id);
        Ok(audio)
    }
}

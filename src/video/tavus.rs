use super::types::{ConversationApi, CreatedConversation};
use crate::config::VideoConfig;
use crate::error::{MaternaError, Result};
use crate::utils::remote_error_message;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const PERSONA_NAME: &str = "Maya Maternal Assistant";

const CONVERSATION_NAME: &str = "Maternal Health Consultation";
const CONVERSATION_CONTEXT: &str = "This is a supportive consultation session between Maya, an AI maternal health assistant, and an expectant or new mother seeking guidance and support.";
const GREETING: &str = "Hello beautiful mama! I'm Maya, your personal maternal health assistant. I'm so excited to be here with you today. How are you feeling, and what can I help you with on your pregnancy journey?";

const PERSONA_PROMPT: &str = "You are Maya, a warm, experienced, and compassionate maternal health assistant. You are an AI designed to provide caring, supportive guidance to expectant and new mothers.

Key characteristics:
- Speak naturally and warmly, as if you're a trusted friend who happens to be a healthcare professional
- Always prioritize the mother's emotional wellbeing alongside physical health guidance
- Keep responses conversational, encouraging, and personalized
- Use inclusive language and be culturally sensitive
- Provide evidence-based information while being empathetic
- Always recommend consulting healthcare providers for medical concerns
- Be patient and understanding of pregnancy anxieties and concerns

Remember: You are not a replacement for medical care, but a supportive companion on the motherhood journey.";

#[derive(Deserialize)]
struct PersonaList {
    #[serde(default)]
    data: Vec<Persona>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub persona_id: String,
    #[serde(default)]
    pub persona_name: Option<String>,
}

/// Client for the avatar conversation API.
pub struct TavusClient {
    client: reqwest::Client,
    api_key: String,
    replica_id: String,
    base_url: String,
    persona_id: Mutex<Option<String>>,
}

impl TavusClient {
    pub fn new(api_key: &str, replica_id: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            replica_id: replica_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            persona_id: Mutex::new(None),
        }
    }

    /// `None` unless both the API key and replica id are usable.
    pub fn from_config(config: &VideoConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let api_key = config.api_key.as_deref()?;
        let replica_id = config.replica_id.as_deref()?;
        Some(Self::new(api_key, replica_id, &config.base_url))
    }

    async fn check(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let fallback = status.canonical_reason().unwrap_or("request failed");
        Err(MaternaError::remote(
            status.as_u16(),
            format!("{}: {}", context, remote_error_message(&body, fallback)),
        ))
    }

    pub async fn list_personas(&self) -> Result<Vec<Persona>> {
        let resp = self
            .client
            .get(format!("{}/v2/personas", self.base_url))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        let resp = Self::check(resp, "Failed to list personas").await?;
        let list: PersonaList = resp.json().await?;
        Ok(list.data)
    }

    pub async fn create_persona(&self) -> Result<String> {
        let body = json!({
            "persona_name": PERSONA_NAME,
            "system_prompt": PERSONA_PROMPT,
            "context": "maternal_health_support",
            "persona_type": "chat",
        });
        let resp = self
            .client
            .post(format!("{}/v2/personas", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = Self::check(resp, "Failed to create persona").await?;
        let persona: Persona = resp.json().await?;
        info!("Created persona {}", persona.persona_id);
        Ok(persona.persona_id)
    }

    /// Reuses the named persona when it already exists, otherwise creates it.
    /// The id is cached for the lifetime of the client.
    pub async fn find_or_create_persona(&self) -> Result<String> {
        let mut cached = self.persona_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let existing = match self.list_personas().await {
            Ok(personas) => personas
                .into_iter()
                .find(|p| p.persona_name.as_deref() == Some(PERSONA_NAME)),
            Err(e) => {
                warn!("Failed to list personas, creating a new one: {}", e);
                None
            }
        };

        let id = match existing {
            Some(persona) => {
                info!("Using existing persona {}", persona.persona_id);
                persona.persona_id
            }
            None => self.create_persona().await?,
        };
        *cached = Some(id.clone());
        Ok(id)
    }

    fn conversation_body(&self, persona_id: &str) -> Value {
        json!({
            "replica_id": self.replica_id,
            "persona_id": persona_id,
            "conversation_name": CONVERSATION_NAME,
            "conversational_context": CONVERSATION_CONTEXT,
            "custom_greeting": GREETING,
            "properties": {
                "max_call_duration": 1800,
                "participant_left_timeout": 60,
                "participant_absent_timeout": 120,
                "enable_recording": false,
                "enable_transcription": false,
                "enable_closed_captions": true,
                "apply_greenscreen": false,
                "language": "english",
            }
        })
    }
}

#[async_trait]
impl ConversationApi for TavusClient {
    async fn create_conversation(&self) -> Result<CreatedConversation> {
        let persona_id = self.find_or_create_persona().await?;
        let resp = self
            .client
            .post(format!("{}/v2/conversations", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&self.conversation_body(&persona_id))
            .send()
            .await?;
        let resp = Self::check(resp, "Failed to create conversation").await?;
        let created: CreatedConversation = resp.json().await?;
        info!(
            "Conversation {} created (status: {})",
            created.id,
            created.status.as_deref().unwrap_or("unknown")
        );
        Ok(created)
    }

    async fn end_conversation(&self, conversation_id: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!(
                "{}/v2/conversations/{}/end",
                self.base_url, conversation_id
            ))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        Self::check(resp, "Failed to end conversation").await?;
        Ok(())
    }
}

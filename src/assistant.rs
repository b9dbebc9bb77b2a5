use crate::config::AssistantConfig;
use crate::error::{MaternaError, RemoteReason, Result};
use async_trait::async_trait;
use rig::{client::CompletionClient, completion::Prompt, providers::openai};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u64 = 1000;
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

/// A single-turn chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String>;
}

pub struct OpenAiChat {
    client: openai::CompletionsClient,
    model: String,
}

impl OpenAiChat {
    pub fn new(api_key: &str, base_url: Option<&str>, model: &str) -> Result<Self> {
        let client: openai::CompletionsClient = openai::CompletionsClient::builder()
            .api_key(api_key)
            .base_url(base_url.unwrap_or(DEFAULT_OPENAI_URL))
            .build()
            .map_err(|e| MaternaError::Config(format!("Failed to build LLM client: {}", e)))?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, preamble: &str, prompt: &str) -> Result<String> {
        let agent = self
            .client
            .agent(self.model.as_str())
            .preamble(preamble)
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| classify_provider_error(&e.to_string()))
    }
}

/// Maps a provider error string onto the crate's remote error reasons.
pub fn classify_provider_error(message: &str) -> MaternaError {
    let lower = message.to_lowercase();
    let (reason, text) = if lower.contains("insufficient_quota") {
        (
            RemoteReason::Quota,
            "API quota exceeded. Please check your billing.".to_string(),
        )
    } else if lower.contains("invalid_request") {
        (RemoteReason::InvalidInput, format!("Invalid request: {}", message))
    } else if lower.contains("invalid_api_key") || lower.contains("401") {
        (RemoteReason::Auth, message.to_string())
    } else if lower.contains("error sending request") || lower.contains("connect") {
        return MaternaError::Network(
            "Network error connecting to the language model. Please try again.".to_string(),
        );
    } else {
        (RemoteReason::Other, message.to_string())
    };
    MaternaError::RemoteApi {
        reason,
        message: text,
    }
}

/// Pregnancy question answering under a named caregiver persona.
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    character_name: String,
}

impl Assistant {
    pub fn new(model: Arc<dyn ChatModel>, character_name: &str) -> Self {
        Self {
            model,
            character_name: character_name.to_string(),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| MaternaError::Config("LLM API key not configured".to_string()))?;
        let chat = OpenAiChat::new(api_key, config.base_url.as_deref(), &config.model)?;
        info!(
            "Assistant {} ready (model: {})",
            config.character_name, config.model
        );
        Ok(Self::new(Arc::new(chat), &config.character_name))
    }

    fn preamble(&self) -> String {
        format!(
            "You are {}, a compassionate and knowledgeable maternal healthcare assistant. \
             Your role is to provide accurate, empathetic, and professional guidance to users \
             seeking advice on maternal health, pregnancy, and childcare.",
            self.character_name
        )
    }

    pub async fn ask(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(MaternaError::Validation(
                "Invalid or missing prompt".to_string(),
            ));
        }

        debug!("Asking assistant ({} chars)", prompt.len());
        let reply = match self.model.complete(&self.preamble(), prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                return Err(e);
            }
        };

        if reply.trim().is_empty() {
            return Ok(EMPTY_REPLY.to_string());
        }
        Ok(reply)
    }
}

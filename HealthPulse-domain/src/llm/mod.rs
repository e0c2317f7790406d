//! Hosted language model access.
//!
//! Services talk to [`LanguageModelClient`]; the HTTP implementation speaks the
//! OpenAI-compatible chat completions protocol.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;
use tracing::{info, warn};

use crate::entities::ChatMessage;

pub mod sse;

#[cfg(feature = "with-llm")]
pub mod openai;

#[cfg(feature = "with-llm")]
pub use openai::OpenAiCompatibleClient;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Language model client errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never got a response
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered with a non-success status
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The reply could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No model is configured
    #[error("Language model is not configured")]
    NotConfigured,
}

/// Text deltas of a streamed reply
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

/// A chat-completion capable model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    /// Name of the model requests go to
    fn model_name(&self) -> String;

    /// Single completion constrained to a JSON object
    async fn generate_json(&self, system: &str, prompt: &str) -> Result<serde_json::Value, LlmError>;

    /// Streamed completion over a conversation. Errors that happen before the
    /// first byte are returned directly; later ones arrive in the stream.
    async fn stream_chat(&self, system: &str, messages: &[ChatMessage]) -> Result<TextStream, LlmError>;
}

pub type SharedLanguageModel = Arc<dyn LanguageModelClient + Send + Sync>;

/// Language model configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    /// Read `LLM_*` variables. None when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LLM_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())?;

        let timeout_seconds = match env::var("LLM_TIMEOUT_SECONDS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid LLM_TIMEOUT_SECONDS '{}', using {}", raw, DEFAULT_TIMEOUT_SECONDS);
                DEFAULT_TIMEOUT_SECONDS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECONDS,
        };

        Some(Self {
            api_key,
            base_url: env::var("LLM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout_seconds,
        })
    }
}

/// Build the configured client, or None when the model is disabled
#[cfg(feature = "with-llm")]
pub fn create_language_model_from_env() -> Option<SharedLanguageModel> {
    let config = LlmConfig::from_env()?;
    match OpenAiCompatibleClient::new(config) {
        Ok(client) => {
            info!("Language model enabled: {}", client.model_name());
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Language model disabled, client could not be built: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "with-llm"))]
pub fn create_language_model_from_env() -> Option<SharedLanguageModel> {
    info!("Language model support not compiled in");
    None
}

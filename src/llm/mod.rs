//! LLM provider clients.
//!
//! A unified [`LlmClient`] trait with Anthropic and OpenAI implementations.
//! Clients are constructed from an explicit [`LlmConfig`]; there is no
//! process-wide client handle and no runtime model mutation. Switching
//! models means constructing a new configured client.

pub mod anthropic;
pub mod backend;
pub mod extractor;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use backend::LlmBackend;
pub use extractor::LlmValueExtractor;
pub use openai::OpenAiClient;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

/// Connection settings for one provider client. Passed at construction;
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: String,
    /// Provider model name; `None` uses the provider default.
    pub model: Option<String>,
    /// Hard bound on any single API call.
    pub timeout: Duration,
}

impl LlmConfig {
    pub fn new(backend: LlmBackend, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            model: None,
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Unified LLM client interface for both providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM with system + user prompts, return raw text.
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Call the LLM expecting a JSON object response.
    /// - OpenAI: uses response_format json_object mode
    /// - Anthropic: adds a JSON-only instruction to the system prompt
    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Model name for logging.
    fn model_name(&self) -> &str;

    /// Provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Construct a client for the configured backend.
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    match config.backend {
        LlmBackend::Anthropic => Ok(Arc::new(AnthropicClient::new(config)?)),
        LlmBackend::OpenAi => Ok(Arc::new(OpenAiClient::new(config)?)),
    }
}

/// Extract the outermost JSON object from a model reply that may carry
/// stray prose or markdown fences around it.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

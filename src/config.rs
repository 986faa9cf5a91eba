//! Environment-driven settings.
//!
//! Reads provider credentials and engine tunables once, at startup. The
//! resulting [`Settings`] feed an explicit [`LlmConfig`]; nothing here is
//! global or mutable at runtime.

use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::extract::CONTEXT_WINDOW_CHARS;
use crate::llm::{LlmBackend, LlmConfig};

/// Default bound on any single LLM call.
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 20;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: LlmBackend,
    pub api_key: String,
    /// Provider model override; `None` uses the provider default.
    pub model: Option<String>,
    pub llm_timeout: Duration,
    /// Context captured around each placeholder occurrence.
    pub context_window_chars: usize,
}

impl Settings {
    /// Load from environment variables.
    ///
    /// - `DOCFILL_BACKEND`: "anthropic" (default) or "openai"
    /// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`: key for the chosen backend
    /// - `DOCFILL_MODEL`: optional model override
    /// - `DOCFILL_LLM_TIMEOUT_SECS`: optional, default 20
    /// - `DOCFILL_CONTEXT_WINDOW`: optional, default 150
    pub fn from_env() -> Result<Self> {
        let backend = LlmBackend::from_env()?;
        let key_var = match backend {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
        };
        let api_key = std::env::var(key_var)
            .map_err(|_| anyhow!("{} environment variable not set", key_var))?;

        let model = std::env::var("DOCFILL_MODEL").ok().filter(|m| !m.is_empty());

        let llm_timeout = match std::env::var("DOCFILL_LLM_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                anyhow!("DOCFILL_LLM_TIMEOUT_SECS must be an integer, got '{}'", raw)
            })?),
            Err(_) => Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        };

        let context_window_chars = match std::env::var("DOCFILL_CONTEXT_WINDOW") {
            Ok(raw) => raw.parse().map_err(|_| {
                anyhow!("DOCFILL_CONTEXT_WINDOW must be an integer, got '{}'", raw)
            })?,
            Err(_) => CONTEXT_WINDOW_CHARS,
        };

        Ok(Self {
            backend,
            api_key,
            model,
            llm_timeout,
            context_window_chars,
        })
    }

    /// Provider client settings derived from these settings.
    pub fn llm_config(&self) -> LlmConfig {
        let mut config =
            LlmConfig::new(self.backend, self.api_key.clone()).with_timeout(self.llm_timeout);
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        config
    }
}

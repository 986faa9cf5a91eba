//! Provider selection for LLM-backed inference and extraction.

use std::str::FromStr;

/// Provider to route chat calls through. Anthropic unless the
/// `DOCFILL_BACKEND` environment variable says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmBackend {
    #[default]
    Anthropic,
    OpenAi,
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized backend '{0}', expected one of: anthropic, claude, openai, gpt")]
pub struct UnknownBackend(String);

impl LlmBackend {
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var("DOCFILL_BACKEND") {
            Ok(value) => Ok(value.parse()?),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LlmBackend::Anthropic => "Anthropic",
            LlmBackend::OpenAi => "OpenAI",
        }
    }
}

impl FromStr for LlmBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmBackend::Anthropic),
            "openai" | "gpt" => Ok(LlmBackend::OpenAi),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! Anthropic Claude API client.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{LlmClient, LlmConfig};

/// Default Anthropic model
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Anthropic Claude API client
#[derive(Clone)]
pub struct AnthropicClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl AnthropicClient {
    /// Create a client from connection settings. The config's timeout is
    /// applied to every request.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            api_key: config.api_key.clone(),
            client,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Internal API call implementation
    async fn call_api(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": 2048,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_prompt}]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Anthropic API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            content: Vec<ContentBlock>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .content
            .first()
            .and_then(|c| c.text.clone())
            .ok_or_else(|| anyhow!("Empty response from Anthropic"))
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.call_api(system_prompt, user_prompt).await
    }

    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        // Anthropic doesn't have json_object mode, rely on prompt engineering
        let json_system = format!(
            "{}\n\nIMPORTANT: Respond with valid JSON only. No markdown code blocks, no explanations.",
            system_prompt
        );
        self.call_api(&json_system, user_prompt).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}

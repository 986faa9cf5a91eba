//! OpenAI API client.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::{LlmClient, LlmConfig};

/// Default OpenAI model
const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl OpenAiClient {
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
    async fn call_api(&self, system_prompt: &str, user_prompt: &str, json_mode: bool) -> Result<String> {
        let mut body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
            "temperature": 0.1
        });

        if json_mode {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| anyhow!("Empty response from OpenAI"))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.call_api(system_prompt, user_prompt, false).await
    }

    async fn chat_json(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.call_api(system_prompt, user_prompt, true).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmBackend;

    #[test]
    fn test_new_client_uses_default_model() {
        let client = OpenAiClient::new(&LlmConfig::new(LlmBackend::OpenAi, "test-key")).unwrap();
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert_eq!(client.provider_name(), "OpenAI");
    }

    #[test]
    fn test_model_override() {
        let config = LlmConfig::new(LlmBackend::OpenAi, "test-key").with_model("gpt-4o-mini");
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }
}

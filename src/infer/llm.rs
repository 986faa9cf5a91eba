//! LLM-backed type/name inference.
//!
//! Same contract as the keyword strategy, same pure `(inputs) -> outputs`
//! shape, but the classification is delegated to an LLM. Every failure
//! mode — transport error, timeout (bounded by the client's configured
//! request timeout), malformed or incomplete JSON — falls back to
//! [`infer_keywords`], so the extraction pipeline always completes.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{infer_keywords, Inference, TypeInference};
use crate::llm::{extract_json_object, LlmClient};
use crate::model::FieldType;

const SYSTEM_PROMPT: &str = "You are a legal document expert. Given one [bracketed placeholder] \
and the document text around it, determine what information it expects.\n\n\
Your response must be ONLY valid JSON:\n\
{\n\
  \"type\": \"text|currency|date|person_name|company_name|address|email|phone|number|other\",\n\
  \"canonical_name\": \"Human-friendly field name\",\n\
  \"description\": \"What information is needed here?\",\n\
  \"confidence\": 0.0\n\
}\n\n\
Rules:\n\
- type must be one of the listed values\n\
- confidence is between 0 and 1\n\
- ENTIRE response is JSON only, start with { end with }";

/// Inference strategy backed by an LLM, with deterministic fallback.
pub struct LlmInference {
    client: Arc<dyn LlmClient>,
}

impl LlmInference {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TypeInference for LlmInference {
    async fn infer(&self, raw_name: &str, context_before: &str, context_after: &str) -> Inference {
        let user_prompt = format!(
            "Placeholder: [{}]\n\nText before:\n{}\n\nText after:\n{}",
            raw_name, context_before, context_after
        );

        match self.client.chat_json(SYSTEM_PROMPT, &user_prompt).await {
            Ok(reply) => match parse_inference(raw_name, &reply) {
                Some(inference) => {
                    debug!(
                        name = raw_name,
                        field_type = %inference.field_type,
                        provider = self.client.provider_name(),
                        "llm inference succeeded"
                    );
                    inference
                }
                None => {
                    warn!(name = raw_name, "llm inference returned malformed JSON, falling back");
                    infer_keywords(raw_name, context_before, context_after)
                }
            },
            Err(error) => {
                warn!(name = raw_name, %error, "llm inference failed, falling back");
                infer_keywords(raw_name, context_before, context_after)
            }
        }
    }
}

/// Parse a model reply into an [`Inference`]. Missing optional fields get
/// sensible defaults; a missing or unusable type makes the whole parse
/// fail so the caller falls back.
fn parse_inference(raw_name: &str, reply: &str) -> Option<Inference> {
    #[derive(serde::Deserialize)]
    struct Reply {
        #[serde(rename = "type")]
        field_type: String,
        canonical_name: Option<String>,
        description: Option<String>,
        confidence: Option<f32>,
    }

    let json = extract_json_object(reply)?;
    let reply: Reply = serde_json::from_str(json).ok()?;

    let field_type = FieldType::parse_lenient(&reply.field_type);
    let canonical_name = reply
        .canonical_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| raw_name.to_string());
    let description = reply
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("Please provide: {}", raw_name.to_lowercase()));
    let confidence = reply.confidence.unwrap_or(0.5).clamp(0.0, 1.0);

    Some(Inference {
        field_type,
        canonical_name,
        description,
        confidence,
    })
}

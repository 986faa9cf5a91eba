//! LLM-backed value extraction.
//!
//! Turns a free-form user utterance into field/value pairs. The prompt
//! carries the filled and unfilled field lists plus the scorer's primary
//! focus so the model can attribute values even when the user never names
//! a field. Errors propagate to the turn engine, which treats the turn as
//! a no-op and asks the user to retry.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{extract_json_object, LlmClient};
use crate::model::{ConversationTurn, Placeholder, Role};
use crate::turn::{Extraction, ValueExtractor};

/// How many recent transcript turns to replay into the prompt.
const HISTORY_TURNS: usize = 10;

/// Value extraction behind an LLM.
pub struct LlmValueExtractor {
    client: Arc<dyn LlmClient>,
}

impl LlmValueExtractor {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    fn system_prompt(primary: &Placeholder, placeholders: &[Placeholder]) -> String {
        let unfilled: Vec<String> = placeholders
            .iter()
            .filter(|p| !p.filled)
            .map(|p| format!("\"{}\" (type: {})", p.raw_name, p.field_type))
            .collect();
        let filled: Vec<String> = placeholders
            .iter()
            .filter(|p| p.filled)
            .map(|p| format!("\"{}\" = \"{}\"", p.raw_name, p.value.as_deref().unwrap_or_default()))
            .collect();
        let filled = if filled.is_empty() {
            "None yet".to_string()
        } else {
            filled.join("\n")
        };

        format!(
            "You are a document filling assistant. Extract values from user input and match them \
to placeholder fields. Even if the user didn't name a field, analyze the VALUE and determine \
which field it belongs to.\n\n\
FILLED FIELDS:\n{}\n\n\
UNFILLED FIELDS:\n{}\n\n\
CURRENT FOCUS (most likely field): \"{}\"\n\
Type: {}\n\
Description: {}\n\n\
Respond with ONLY this JSON (no text outside it):\n\
{{\n\
  \"assistant_message\": \"Acknowledge what was provided, then suggest the next field\",\n\
  \"filled_values\": {{\"Field Name\": \"exact value from user\"}},\n\
  \"next_field\": \"Name of next unfilled field or null\"\n\
}}\n\n\
Rules:\n\
- Use EXACT field names from the UNFILLED FIELDS list as keys\n\
- Extract values exactly as the user stated them\n\
- Report every field/value pair you can identify confidently, not only the focus field",
            filled,
            unfilled.join("\n"),
            primary.raw_name,
            primary.field_type,
            primary.description,
        )
    }

    /// The turn engine records the utterance on the transcript before the
    /// extractor is called, so replaying the transcript already carries it.
    /// Append only for callers that pass a transcript without it.
    fn user_prompt(utterance: &str, transcript: &[ConversationTurn]) -> String {
        let mut lines = Vec::new();
        let start = transcript.len().saturating_sub(HISTORY_TURNS);
        for turn in &transcript[start..] {
            let speaker = match turn.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            lines.push(format!("{}: {}", speaker, turn.text));
        }
        let already_present = transcript
            .last()
            .is_some_and(|t| t.role == Role::User && t.text == utterance);
        if !already_present {
            lines.push(format!("User: {}", utterance));
        }
        lines.join("\n")
    }
}

#[async_trait]
impl ValueExtractor for LlmValueExtractor {
    async fn extract(
        &self,
        utterance: &str,
        primary: &Placeholder,
        placeholders: &[Placeholder],
        transcript: &[ConversationTurn],
    ) -> anyhow::Result<Extraction> {
        let system = Self::system_prompt(primary, placeholders);
        let user = Self::user_prompt(utterance, transcript);

        let reply = self.client.chat_json(&system, &user).await?;
        let extraction = parse_extraction(&reply)?;
        debug!(
            values = extraction.filled_values.len(),
            provider = self.client.provider_name(),
            "llm extraction parsed"
        );
        Ok(extraction)
    }
}

/// Parse the model reply. The original service went through several field
/// name iterations for the next-question hint, so both `next_field` and
/// `next_question` are accepted.
fn parse_extraction(reply: &str) -> anyhow::Result<Extraction> {
    #[derive(serde::Deserialize)]
    struct Reply {
        assistant_message: Option<String>,
        #[serde(default)]
        filled_values: BTreeMap<String, String>,
        #[serde(default)]
        next_field: Option<String>,
        #[serde(default)]
        next_question: Option<String>,
    }

    let json = extract_json_object(reply)
        .ok_or_else(|| anyhow::anyhow!("no JSON object in extraction reply"))?;
    let reply: Reply = serde_json::from_str(json)?;

    Ok(Extraction {
        assistant_message: reply.assistant_message.unwrap_or_default(),
        filled_values: reply.filled_values,
        next_field: reply.next_field.or(reply.next_question),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct StubClient {
        reply: Result<String, String>,
    }

    #[async_trait]
    impl LlmClient for StubClient {
        async fn chat(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            self.chat_json(_system, _user).await
        }

        async fn chat_json(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            self.reply.clone().map_err(|e| anyhow!(e))
        }

        fn model_name(&self) -> &str {
            "stub"
        }

        fn provider_name(&self) -> &str {
            "Stub"
        }
    }

    fn placeholder(name: &str) -> Placeholder {
        Placeholder::new(name, "", "")
    }

    #[test]
    fn test_parse_extraction_with_both_next_keys() {
        let a = parse_extraction(
            r#"{"assistant_message": "ok", "filled_values": {"Date": "2025-01-01"}, "next_field": "Company Name"}"#,
        )
        .unwrap();
        assert_eq!(a.next_field.as_deref(), Some("Company Name"));

        let b = parse_extraction(
            r#"{"assistant_message": "ok", "filled_values": {}, "next_question": "Date"}"#,
        )
        .unwrap();
        assert_eq!(b.next_field.as_deref(), Some("Date"));
    }

    #[test]
    fn test_parse_extraction_rejects_non_json() {
        assert!(parse_extraction("sure, the date is January first").is_err());
    }

    #[test]
    fn test_system_prompt_lists_fields() {
        let mut filled = placeholder("Company Name");
        filled.fill("ABC Corp");
        let unfilled = placeholder("Date");

        let prompt = LlmValueExtractor::system_prompt(&unfilled, &[filled, unfilled.clone()]);

        assert!(prompt.contains("\"Company Name\" = \"ABC Corp\""));
        assert!(prompt.contains("\"Date\" (type: text)"));
        assert!(prompt.contains("CURRENT FOCUS (most likely field): \"Date\""));
    }

    #[test]
    fn test_user_prompt_replays_recent_history() {
        // As the engine calls it: the transcript already ends with the
        // current utterance, which must not be repeated.
        let transcript = vec![
            ConversationTurn::assistant("Please provide the date."),
            ConversationTurn::user("January 1, 2025"),
        ];
        let prompt = LlmValueExtractor::user_prompt("January 1, 2025", &transcript);
        assert!(prompt.starts_with("Assistant: Please provide the date."));
        assert!(prompt.ends_with("User: January 1, 2025"));
        assert_eq!(prompt.matches("User: January 1, 2025").count(), 1);
    }

    #[test]
    fn test_user_prompt_appends_utterance_when_transcript_lacks_it() {
        let transcript = vec![ConversationTurn::assistant("Please provide the date.")];
        let prompt = LlmValueExtractor::user_prompt("January 1, 2025", &transcript);
        assert!(prompt.ends_with("User: January 1, 2025"));
        assert_eq!(prompt.matches("User: January 1, 2025").count(), 1);
    }

    #[tokio::test]
    async fn test_engine_turn_sends_utterance_once() {
        use crate::model::SessionState;
        use crate::turn::TurnEngine;

        struct CapturingClient {
            last_user_prompt: std::sync::Mutex<Option<String>>,
        }

        #[async_trait]
        impl LlmClient for CapturingClient {
            async fn chat(&self, system: &str, user: &str) -> anyhow::Result<String> {
                self.chat_json(system, user).await
            }

            async fn chat_json(&self, _system: &str, user: &str) -> anyhow::Result<String> {
                *self.last_user_prompt.lock().unwrap() = Some(user.to_string());
                Ok(r#"{"assistant_message": "Got it.", "filled_values": {"Date": "2025-01-01"}, "next_field": null}"#.to_string())
            }

            fn model_name(&self) -> &str {
                "stub"
            }

            fn provider_name(&self) -> &str {
                "Stub"
            }
        }

        let client = Arc::new(CapturingClient {
            last_user_prompt: std::sync::Mutex::new(None),
        });
        let engine = TurnEngine::new(Arc::new(LlmValueExtractor::new(client.clone())));
        let document = crate::document::TemplateDocument::from_plain_text("Signed on [Date].");
        let mut session = SessionState::new(document, vec![placeholder("Date")]);
        session.push_turn(ConversationTurn::assistant("Please provide the date."));

        engine.process(&mut session, "the date is 2025-01-01").await;

        let prompt = client.last_user_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(prompt.matches("User: the date is 2025-01-01").count(), 1);
    }

    #[tokio::test]
    async fn test_extract_end_to_end_with_stub() {
        let extractor = LlmValueExtractor::new(Arc::new(StubClient {
            reply: Ok(
                r#"{"assistant_message": "Got it.", "filled_values": {"Date": "2025-01-01"}, "next_field": null}"#
                    .to_string(),
            ),
        }));
        let p = placeholder("Date");

        let extraction = extractor
            .extract("the date is 2025-01-01", &p, &[p.clone()], &[])
            .await
            .unwrap();

        assert_eq!(extraction.filled_values.get("Date").map(String::as_str), Some("2025-01-01"));
        assert_eq!(extraction.assistant_message, "Got it.");
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let extractor = LlmValueExtractor::new(Arc::new(StubClient {
            reply: Err("timeout".to_string()),
        }));
        let p = placeholder("Date");

        let result = extractor.extract("anything", &p, &[p.clone()], &[]).await;
        assert!(result.is_err());
    }
}

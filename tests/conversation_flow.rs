//! End-to-end conversation flow: upload, multi-turn fill with ambiguity,
//! correction, and render.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use docfill::{
    AssistError, ConversationTurn, DocumentAssistant, Extraction, InMemorySessionStore,
    KeywordInference, Placeholder, TemplateDocument, TurnPhase, ValueExtractor,
};

/// Deterministic stand-in for the LLM extraction step: splits the
/// utterance on " and ", attributes each clause containing an unfilled
/// field's name token to that field, and otherwise assigns the whole
/// utterance to the primary focus.
struct ClauseExtractor;

#[async_trait]
impl ValueExtractor for ClauseExtractor {
    async fn extract(
        &self,
        utterance: &str,
        primary: &Placeholder,
        placeholders: &[Placeholder],
        _transcript: &[ConversationTurn],
    ) -> anyhow::Result<Extraction> {
        let mut filled_values = BTreeMap::new();

        for clause in utterance.split(" and ") {
            let clause_lower = clause.to_lowercase();
            let target = placeholders.iter().filter(|p| !p.filled).find(|p| {
                p.raw_name
                    .to_lowercase()
                    .split_whitespace()
                    .any(|token| token.len() > 2 && clause_lower.contains(token))
            });
            if let Some(target) = target {
                let value = clause.rsplit(" is ").next().unwrap_or(clause).trim();
                filled_values.insert(target.raw_name.clone(), value.to_string());
            }
        }

        if filled_values.is_empty() {
            filled_values.insert(primary.raw_name.clone(), utterance.trim().to_string());
        }

        Ok(Extraction {
            assistant_message: String::new(),
            filled_values,
            next_field: None,
        })
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn agreement() -> TemplateDocument {
    TemplateDocument::from_plain_text(
        "SIMPLE AGREEMENT\n\
         This agreement is between [Investor Name] and [Company Name].\n\
         The purchase amount is [Purchase Amount], payable on [Date].",
    )
}

fn assistant() -> DocumentAssistant {
    DocumentAssistant::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(KeywordInference),
        Arc::new(ClauseExtractor),
    )
}

#[tokio::test]
async fn full_conversation_fills_and_renders() {
    init_tracing();
    let assistant = assistant();

    let upload = assistant.upload(agreement()).await.unwrap();
    assert_eq!(upload.placeholders.len(), 4);
    assert!(upload.greeting.contains("Investor Name"));

    // One utterance filling two fields at once.
    let turn = assistant
        .chat(
            upload.session_id,
            "The company is ABC Corp and the investor is Jane Doe",
        )
        .await
        .unwrap();
    assert_eq!(turn.applied.len(), 2);
    assert_eq!(turn.phase, TurnPhase::AwaitingInput);
    assert_eq!(turn.next_field.as_deref(), Some("Purchase Amount"));

    // Render is still gated.
    let err = assistant.render(upload.session_id).await.unwrap_err();
    match err {
        AssistError::IncompleteFields { unfilled } => {
            assert_eq!(unfilled, vec!["Purchase Amount".to_string(), "Date".to_string()]);
        }
        other => panic!("expected IncompleteFields, got {other}"),
    }

    let turn = assistant
        .chat(upload.session_id, "the amount is $500,000")
        .await
        .unwrap();
    assert_eq!(turn.next_field.as_deref(), Some("Date"));

    let turn = assistant
        .chat(upload.session_id, "the date is January 1, 2025")
        .await
        .unwrap();
    assert_eq!(turn.phase, TurnPhase::Complete);
    assert_eq!(turn.next_field, None);

    let status = assistant.status(upload.session_id).await.unwrap();
    assert!(status.completed);
    assert_eq!(status.progress(), "4/4");

    let (rendered, summary) = assistant.render(upload.session_id).await.unwrap();
    assert!(summary.warnings.is_empty());
    let text = rendered.plain_text();
    assert!(text.contains("between Jane Doe and ABC Corp"));
    assert!(text.contains("amount is $500,000"));
    assert!(text.contains("payable on January 1, 2025"));
    assert!(!text.contains('['), "rendered text still has brackets: {text}");

    // A fully rendered document yields no placeholders on re-extraction.
    assert!(docfill::find_placeholders(&text).is_empty());
}

#[tokio::test]
async fn correction_after_completion_rerenders() {
    init_tracing();
    let assistant = assistant();

    let upload = assistant
        .upload(TemplateDocument::from_plain_text("signed on [Date]"))
        .await
        .unwrap();

    assistant.chat(upload.session_id, "2025-01-01").await.unwrap();
    assert!(assistant.status(upload.session_id).await.unwrap().completed);

    // Chatting after completion is informational, not an error.
    let turn = assistant.chat(upload.session_id, "anything else?").await.unwrap();
    assert_eq!(turn.phase, TurnPhase::Complete);
    assert!(turn.applied.is_empty());

    // Correct the date and render again.
    assert!(assistant.reset_field(upload.session_id, "Date").await.unwrap());
    let turn = assistant.chat(upload.session_id, "2026-06-30").await.unwrap();
    assert_eq!(turn.phase, TurnPhase::Complete);

    let (rendered, _) = assistant.render(upload.session_id).await.unwrap();
    assert_eq!(rendered.plain_text(), "signed on 2026-06-30");
}

#[tokio::test]
async fn parallel_sessions_do_not_interfere() {
    init_tracing();
    let assistant = Arc::new(assistant());

    let a = assistant.upload(agreement()).await.unwrap();
    let b = assistant.upload(agreement()).await.unwrap();
    assert_ne!(a.session_id, b.session_id);

    let (ra, rb) = tokio::join!(
        assistant.chat(a.session_id, "the investor is Jane Doe"),
        assistant.chat(b.session_id, "the investor is John Smith"),
    );
    ra.unwrap();
    rb.unwrap();

    let sa = assistant.status(a.session_id).await.unwrap();
    let sb = assistant.status(b.session_id).await.unwrap();
    assert_eq!(sa.progress(), "1/4");
    assert_eq!(sb.progress(), "1/4");
}

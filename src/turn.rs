//! Conversation state machine.
//!
//! Drives the turn-by-turn resolution loop: accept an utterance, score it
//! against the unfilled placeholders to find the primary focus, delegate
//! value extraction to a [`ValueExtractor`], apply every reported
//! (name, value) pair, and propose the next unfilled placeholder in
//! document order.
//!
//! Phases per turn:
//!
//! ```text
//! AwaitingInput → Resolving → Updated → (AwaitingInput | Complete)
//! ```
//!
//! `Complete` is re-entrant: resetting a placeholder's fill re-opens the
//! session for corrective edits. An extraction failure ends the turn with
//! zero placeholder mutation and a retry prompt; already-filled values are
//! never corrupted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::TurnWarning;
use crate::model::{ConversationTurn, Placeholder, SessionState};
use crate::score;

/// Where the state machine landed after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// More input needed; unfilled placeholders remain.
    AwaitingInput,
    /// Every placeholder is filled.
    Complete,
}

/// Structured output of one value-extraction call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Natural-language reply to show the user.
    pub assistant_message: String,
    /// Field name → extracted value. May contain more than the primary
    /// focus field when one utterance provides several values.
    #[serde(default)]
    pub filled_values: BTreeMap<String, String>,
    /// Field the extractor suggests asking for next. Advisory; the state
    /// machine proposes the first unfilled placeholder in document order.
    #[serde(default)]
    pub next_field: Option<String>,
}

/// Natural-language value extraction, typically LLM-backed. Must return
/// within its own bounded timeout; any failure makes the turn a no-op.
#[async_trait]
pub trait ValueExtractor: Send + Sync {
    async fn extract(
        &self,
        utterance: &str,
        primary: &Placeholder,
        placeholders: &[Placeholder],
        transcript: &[ConversationTurn],
    ) -> anyhow::Result<Extraction>;
}

/// Result of processing one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub assistant_message: String,
    /// Pairs actually applied to placeholders this turn (exact raw names).
    pub applied: Vec<(String, String)>,
    /// First unfilled placeholder in document order, if any.
    pub next_field: Option<String>,
    pub phase: TurnPhase,
    /// Non-fatal conditions encountered while applying values.
    pub warnings: Vec<TurnWarning>,
}

/// The conversation engine. Stateless itself; all fill state lives on the
/// [`SessionState`] passed into each turn.
pub struct TurnEngine {
    extractor: Arc<dyn ValueExtractor>,
}

impl TurnEngine {
    pub fn new(extractor: Arc<dyn ValueExtractor>) -> Self {
        Self { extractor }
    }

    /// Process one user utterance against a session.
    ///
    /// The caller must hold the session exclusively for the duration of the
    /// turn (one in-flight turn per session).
    pub async fn process(&self, session: &mut SessionState, utterance: &str) -> TurnOutcome {
        session.push_turn(ConversationTurn::user(utterance));

        // Resolving: nothing unfilled means there is nothing to do.
        let unfilled = session.unfilled();
        if unfilled.is_empty() {
            let message = "All fields are filled. You can review values, correct one by naming it, or render the document.".to_string();
            session.push_turn(ConversationTurn::assistant(&message));
            return TurnOutcome {
                assistant_message: message,
                applied: Vec::new(),
                next_field: None,
                phase: TurnPhase::Complete,
                warnings: Vec::new(),
            };
        }

        let matched = score::best_match(utterance, &unfilled)
            .map(|m| unfilled[m.index].clone())
            .unwrap_or_else(|| unfilled[0].clone());
        debug!(primary = %matched.raw_name, "resolved primary focus");

        let extraction = match self
            .extractor
            .extract(utterance, &matched, &session.placeholders, &session.transcript)
            .await
        {
            Ok(extraction) => extraction,
            Err(error) => {
                // No-op turn: no placeholder is touched, user is asked to retry.
                warn!(%error, "value extraction failed");
                let message = format!(
                    "Sorry, I couldn't process that. Could you rephrase? I'm currently looking for: {}",
                    matched.description
                );
                session.push_turn(ConversationTurn::assistant(&message));
                return TurnOutcome {
                    assistant_message: message,
                    applied: Vec::new(),
                    next_field: Some(matched.raw_name.clone()),
                    phase: TurnPhase::AwaitingInput,
                    warnings: Vec::new(),
                };
            }
        };

        // Updated: apply every reported pair, not only the primary focus.
        let (applied, warnings) = apply_values(&mut session.placeholders, &extraction.filled_values);
        for (name, value) in &applied {
            info!(field = %name, value = %value, "filled placeholder");
        }

        let next_field = session.next_unfilled().map(|p| p.raw_name.clone());
        let phase = if session.is_complete() {
            TurnPhase::Complete
        } else {
            TurnPhase::AwaitingInput
        };

        let assistant_message = if extraction.assistant_message.trim().is_empty() {
            default_reply(&applied, next_field.as_deref())
        } else {
            extraction.assistant_message.clone()
        };
        session.push_turn(ConversationTurn::assistant(&assistant_message));

        TurnOutcome {
            assistant_message,
            applied,
            next_field,
            phase,
            warnings,
        }
    }
}

/// Apply extracted (name, value) pairs to the placeholder list.
///
/// Name matching policy, most to least strict: case-insensitive exact match
/// on raw or canonical name, then substring containment in either
/// direction. An unmatched name is surfaced as a warning and does not stop
/// the remaining pairs from applying. Matching runs against all
/// placeholders, so an already-filled field can be overwritten by a
/// corrective turn.
fn apply_values(
    placeholders: &mut [Placeholder],
    values: &BTreeMap<String, String>,
) -> (Vec<(String, String)>, Vec<TurnWarning>) {
    let mut applied = Vec::new();
    let mut warnings = Vec::new();

    for (name, value) in values {
        let target = find_target(placeholders, name);
        match target {
            Some(index) => {
                placeholders[index].fill(value.clone());
                applied.push((placeholders[index].raw_name.clone(), value.clone()));
            }
            None => {
                warn!(field = %name, "extraction reported a field with no placeholder match");
                warnings.push(TurnWarning::UnmatchedField {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
        }
    }

    (applied, warnings)
}

fn find_target(placeholders: &[Placeholder], name: &str) -> Option<usize> {
    if let Some(index) = placeholders.iter().position(|p| p.answers_to(name)) {
        return Some(index);
    }

    // Substring fallback: extracted name contained in placeholder name or
    // vice versa, case-insensitively.
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    placeholders.iter().position(|p| {
        let raw = p.raw_name.to_lowercase();
        let canonical = p.canonical_name.to_lowercase();
        raw.contains(&needle)
            || needle.contains(&raw)
            || canonical.contains(&needle)
            || needle.contains(&canonical)
    })
}

fn default_reply(applied: &[(String, String)], next_field: Option<&str>) -> String {
    let mut message = if applied.is_empty() {
        "I didn't catch a value for any field.".to_string()
    } else {
        let filled: Vec<String> = applied
            .iter()
            .map(|(name, value)| format!("{} is {}", name, value))
            .collect();
        format!("Acknowledged: {}.", filled.join(", "))
    };
    match next_field {
        Some(next) => message.push_str(&format!(" Next, please provide: {}.", next)),
        None => message.push_str(" All fields are filled."),
    }
    message
}

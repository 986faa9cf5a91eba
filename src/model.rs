//! Core data model for placeholder resolution.
//!
//! A [`Placeholder`] is one bracketed slot in a document. Its `raw_name` is
//! the exact text inside the brackets and is the identity key used to match
//! the slot back to the document at render time. Everything else on the
//! record (type, canonical name, description, confidence) is inference
//! output used only to drive the conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::TemplateDocument;

/// Semantic type of the value a placeholder expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Currency,
    Date,
    PersonName,
    CompanyName,
    Address,
    Email,
    Phone,
    Number,
    Other,
}

impl FieldType {
    /// All types considered by the deterministic inference strategy.
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Currency,
        FieldType::Date,
        FieldType::PersonName,
        FieldType::CompanyName,
        FieldType::Address,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Number,
        FieldType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::PersonName => "person_name",
            FieldType::CompanyName => "company_name",
            FieldType::Address => "address",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Other => "other",
        }
    }

    /// Parse a type name as reported by an external inference service.
    /// Unknown names map to `Other` rather than failing the pipeline.
    pub fn parse_lenient(s: &str) -> FieldType {
        match s.trim().to_lowercase().as_str() {
            "text" => FieldType::Text,
            "currency" | "money" | "amount" => FieldType::Currency,
            "date" => FieldType::Date,
            "person_name" | "person" | "name" => FieldType::PersonName,
            "company_name" | "company" | "organization" => FieldType::CompanyName,
            "address" => FieldType::Address,
            "email" => FieldType::Email,
            "phone" => FieldType::Phone,
            "number" => FieldType::Number,
            _ => FieldType::Other,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One bracketed slot in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    /// Exact text inside the brackets, case-preserving. Render key.
    pub raw_name: String,
    /// Bounded text window before the first occurrence. Inference only.
    pub context_before: String,
    /// Bounded text window after the first occurrence. Inference only.
    pub context_after: String,
    /// Inferred semantic type.
    pub field_type: FieldType,
    /// Human-friendly display name; defaults to `raw_name`.
    pub canonical_name: String,
    /// Short prompt shown to the user.
    pub description: String,
    /// Whether a value has been collected.
    pub filled: bool,
    /// Collected value; `Some` iff `filled`. Re-filling overwrites.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Inference confidence in [0, 1]. Advisory only.
    pub confidence: f32,
}

impl Placeholder {
    /// Create an uninferred placeholder with default type and prompts.
    pub fn new(raw_name: impl Into<String>, before: impl Into<String>, after: impl Into<String>) -> Self {
        let raw_name = raw_name.into();
        let description = format!("Please provide: {}", raw_name.to_lowercase());
        Self {
            canonical_name: raw_name.clone(),
            raw_name,
            context_before: before.into(),
            context_after: after.into(),
            field_type: FieldType::Text,
            description,
            filled: false,
            value: None,
            confidence: 0.0,
        }
    }

    /// Record a collected value. Overwrites any previous fill.
    pub fn fill(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.filled = true;
    }

    /// Clear the fill so the conversation can collect a correction.
    pub fn reset(&mut self) {
        self.value = None;
        self.filled = false;
    }

    /// Case-insensitive match of an externally reported field name against
    /// this placeholder's raw or canonical name.
    pub fn answers_to(&self, name: &str) -> bool {
        let name = name.trim();
        self.raw_name.eq_ignore_ascii_case(name) || self.canonical_name.eq_ignore_ascii_case(name)
    }
}

/// Speaker role in the conversation transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry. Append-only, in causal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Per-document fill state. One per uploaded document, owned exclusively by
/// the turn currently processing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub document: TemplateDocument,
    /// Placeholders in order of first occurrence in the source text.
    pub placeholders: Vec<Placeholder>,
    pub transcript: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(document: TemplateDocument, placeholders: Vec<Placeholder>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document,
            placeholders,
            transcript: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn unfilled(&self) -> Vec<&Placeholder> {
        self.placeholders.iter().filter(|p| !p.filled).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.placeholders.iter().filter(|p| p.filled).count()
    }

    pub fn is_complete(&self) -> bool {
        self.placeholders.iter().all(|p| p.filled)
    }

    /// First unfilled placeholder in document order, if any.
    pub fn next_unfilled(&self) -> Option<&Placeholder> {
        self.placeholders.iter().find(|p| !p.filled)
    }

    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.transcript.push(turn);
        self.updated_at = Utc::now();
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            filled: self.filled_count(),
            total: self.placeholders.len(),
            completed: self.is_complete(),
            unfilled_names: self
                .placeholders
                .iter()
                .filter(|p| !p.filled)
                .map(|p| p.raw_name.clone())
                .collect(),
        }
    }
}

/// Progress report for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub filled: usize,
    pub total: usize,
    pub completed: bool,
    pub unfilled_names: Vec<String>,
}

impl SessionStatus {
    /// Progress string as shown to the user, e.g. "3/7".
    pub fn progress(&self) -> String {
        format!("{}/{}", self.filled, self.total)
    }
}

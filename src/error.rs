//! Error taxonomy for the resolution engine.
//!
//! Only two conditions propagate to the caller as hard errors: failing to
//! obtain source text on upload, and attempting to render with unfilled
//! fields. Inference and value-extraction failures are absorbed locally
//! (deterministic fallback, no-op turn) and never surface here.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the assistant API.
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("failed to extract text from document: {0}")]
    Extraction(String),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("cannot render: unfilled fields remain: {}", .unfilled.join(", "))]
    IncompleteFields { unfilled: Vec<String> },
}

pub type AssistResult<T> = Result<T, AssistError>;

/// Non-fatal condition raised while applying extracted values in a turn.
/// Surfaced on the turn outcome for visibility; never aborts the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnWarning {
    /// The extraction step reported a field name with no placeholder match.
    UnmatchedField { name: String, value: String },
}

impl std::fmt::Display for TurnWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnWarning::UnmatchedField { name, value } => {
                write!(f, "no placeholder matches field '{}' (value '{}')", name, value)
            }
        }
    }
}

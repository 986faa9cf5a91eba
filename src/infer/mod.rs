//! Type/name inference for placeholders.
//!
//! Given a placeholder's raw name and its surrounding context, inference
//! proposes a semantic type, a canonical display name, a user-facing
//! description, and a confidence. Two strategies sit behind one trait:
//!
//! 1. [`KeywordInference`] — deterministic weighted keyword scoring. Always
//!    available, no external dependency; this is the authoritative strategy
//!    for testing.
//! 2. [`LlmInference`] — asks an LLM for the same outputs and falls back to
//!    the keyword strategy on any error, timeout, or malformed reply.
//!
//! Inference never blocks the extraction pipeline from completing.

pub mod keyword;
pub mod llm;

pub use keyword::{infer_keywords, type_keywords, KeywordInference};
pub use llm::LlmInference;

use async_trait::async_trait;

use crate::model::{FieldType, Placeholder};

/// Output of a single inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    pub field_type: FieldType,
    pub canonical_name: String,
    pub description: String,
    pub confidence: f32,
}

/// Pluggable inference strategy. Implementations must be infallible: any
/// internal failure is recovered by falling back to deterministic output.
#[async_trait]
pub trait TypeInference: Send + Sync {
    async fn infer(&self, raw_name: &str, context_before: &str, context_after: &str) -> Inference;
}

/// Run inference over freshly extracted placeholders, enriching each record
/// in place.
pub async fn enrich_placeholders(placeholders: &mut [Placeholder], strategy: &dyn TypeInference) {
    for p in placeholders.iter_mut() {
        let inference = strategy
            .infer(&p.raw_name, &p.context_before, &p.context_after)
            .await;
        p.field_type = inference.field_type;
        p.canonical_name = inference.canonical_name;
        p.description = inference.description;
        p.confidence = inference.confidence;
    }
}

//! Utterance-to-placeholder match scoring.
//!
//! Given a free-text user utterance and the currently unfilled
//! placeholders, computes an additive relevance score per candidate and
//! selects the best one. Pure and deterministic: no hidden state, identical
//! inputs always produce identical output. Ties break toward document
//! order, which makes first-occurrence order the default disambiguation
//! order.

use tracing::debug;

use crate::infer::type_keywords;
use crate::model::Placeholder;

/// Scoring weights. An exact name hit alone is enough for full confidence.
const NAME_MATCH: u32 = 100;
const NAME_PART_MATCH: u32 = 25;
const TYPE_KEYWORD_MATCH: u32 = 15;
const DESCRIPTION_WORD_MATCH: u32 = 5;

/// A selected candidate with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Index into the candidate slice passed to [`best_match`].
    pub index: usize,
    /// Raw additive score.
    pub score: u32,
    /// `min(score / 100, 1.0)`.
    pub confidence: f32,
}

/// Additive relevance score between one utterance and one candidate.
///
/// - +100 if the candidate's full raw name (lowercased) appears in the
///   utterance.
/// - +25 per whitespace-delimited name token (len > 2) found in the
///   utterance.
/// - +15 per keyword of the candidate's type keyword set found in the
///   utterance (same sets the keyword inference strategy uses).
/// - +5 per description word (len > 3) found in the utterance.
pub fn match_score(utterance: &str, candidate: &Placeholder) -> u32 {
    let utterance = utterance.to_lowercase();
    let name = candidate.raw_name.to_lowercase();

    let mut score = 0;

    if utterance.contains(&name) {
        score += NAME_MATCH;
    }

    for part in name.split_whitespace() {
        if part.len() > 2 && utterance.contains(part) {
            score += NAME_PART_MATCH;
        }
    }

    for (keyword, _) in type_keywords(candidate.field_type) {
        if utterance.contains(keyword) {
            score += TYPE_KEYWORD_MATCH;
        }
    }

    for word in candidate.description.to_lowercase().split_whitespace() {
        if word.len() > 3 && utterance.contains(word) {
            score += DESCRIPTION_WORD_MATCH;
        }
    }

    score
}

/// Select the best-matching unfilled placeholder for an utterance.
///
/// Returns `None` for an empty candidate set. A single candidate is
/// returned with confidence 1.0 regardless of utterance content, since no
/// ambiguity is possible. Otherwise the maximum score wins, with ties
/// broken by position (first in document order).
pub fn best_match(utterance: &str, candidates: &[&Placeholder]) -> Option<MatchResult> {
    if candidates.is_empty() {
        return None;
    }

    if candidates.len() == 1 {
        return Some(MatchResult {
            index: 0,
            score: NAME_MATCH,
            confidence: 1.0,
        });
    }

    let mut best = MatchResult {
        index: 0,
        score: match_score(utterance, candidates[0]),
        confidence: 0.0,
    };
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        let score = match_score(utterance, candidate);
        debug!(name = %candidate.raw_name, score, "scored candidate");
        if score > best.score {
            best = MatchResult {
                index,
                score,
                confidence: 0.0,
            };
        }
    }

    best.confidence = (best.score as f32 / NAME_MATCH as f32).min(1.0);
    Some(best)
}

//! Deterministic keyword-scoring inference.
//!
//! Each candidate type carries a weighted keyword set. A placeholder is
//! classified by summing keyword weights over its lowercased raw name and
//! context, with name hits counting double. The argmax type wins; an
//! all-zero score defaults to `Text`. The same keyword sets (without
//! weights) feed the match scorer, so utterance disambiguation and type
//! inference agree on what, say, "currency-ish" words look like.

use async_trait::async_trait;

use super::{Inference, TypeInference};
use crate::model::FieldType;

/// Weighted cue words per type. Weights favour words that are distinctive
/// for the type over generic ones ("company" is strong evidence, "name" is
/// weak).
const KEYWORD_WEIGHTS: &[(FieldType, &[(&str, u32)])] = &[
    (
        FieldType::Currency,
        &[
            ("amount", 3),
            ("price", 3),
            ("fee", 3),
            ("payment", 3),
            ("dollar", 3),
            ("$", 2),
            ("cost", 2),
            ("paid", 2),
            ("sum", 2),
            ("consideration", 2),
            ("purchase", 2),
            ("invest", 1),
        ],
    ),
    (
        FieldType::Date,
        &[
            ("date", 4),
            ("dated", 3),
            ("deadline", 2),
            ("expiration", 2),
            ("expiry", 2),
            ("day", 1),
            ("month", 1),
            ("year", 1),
        ],
    ),
    (
        FieldType::PersonName,
        &[
            ("signatory", 3),
            ("investor", 2),
            ("founder", 2),
            ("director", 2),
            ("witness", 2),
            ("person", 2),
            ("employee", 2),
            ("mr", 1),
            ("ms", 1),
            ("name", 1),
            ("partner", 1),
        ],
    ),
    (
        FieldType::CompanyName,
        &[
            ("company", 4),
            ("corporation", 3),
            ("corp", 2),
            ("inc", 2),
            ("llc", 2),
            ("ltd", 2),
            ("organization", 2),
            ("business", 2),
            ("entity", 2),
            ("firm", 2),
        ],
    ),
    (
        FieldType::Address,
        &[
            ("address", 4),
            ("street", 2),
            ("city", 2),
            ("zip", 2),
            ("state", 1),
            ("road", 1),
            ("avenue", 1),
            ("office", 1),
        ],
    ),
    (
        FieldType::Email,
        &[("email", 4), ("e-mail", 4), ("@", 2), ("inbox", 1)],
    ),
    (
        FieldType::Phone,
        &[
            ("phone", 4),
            ("telephone", 4),
            ("mobile", 2),
            ("fax", 2),
            ("cell", 1),
            ("call", 1),
        ],
    ),
    (
        FieldType::Number,
        &[
            ("number", 2),
            ("quantity", 2),
            ("count", 2),
            ("shares", 2),
            ("percentage", 2),
            ("percent", 2),
            ("%", 2),
        ],
    ),
    (
        FieldType::Text,
        &[("title", 2), ("position", 1), ("role", 1), ("ceo", 1)],
    ),
];

/// Keyword set for a type, as used by the match scorer. Empty for types
/// with no cue words.
pub fn type_keywords(field_type: FieldType) -> &'static [(&'static str, u32)] {
    KEYWORD_WEIGHTS
        .iter()
        .find(|(ft, _)| *ft == field_type)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

fn score_type(field_type: FieldType, name_lower: &str, context_lower: &str) -> u32 {
    let mut score = 0;
    for (keyword, weight) in type_keywords(field_type) {
        if contains_word(name_lower, keyword) {
            score += weight * 2;
        } else if contains_word(context_lower, keyword) {
            score += weight;
        }
    }
    score
}

/// Word-boundary-aware containment for alphanumeric keywords; plain
/// substring containment for symbol cues like "$" or "@".
fn contains_word(haystack: &str, keyword: &str) -> bool {
    if !keyword.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return haystack.contains(keyword);
    }
    haystack
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '-')
        .any(|w| w == keyword)
}

/// Deterministic inference over `raw_name` plus both context windows.
///
/// Pure: identical inputs always yield identical output.
pub fn infer_keywords(raw_name: &str, context_before: &str, context_after: &str) -> Inference {
    let name_lower = raw_name.to_lowercase();
    let context_lower = format!("{} {}", context_before, context_after).to_lowercase();

    let mut best = FieldType::Text;
    let mut best_score = 0u32;
    for ft in FieldType::ALL {
        let score = score_type(ft, &name_lower, &context_lower);
        if score > best_score {
            best = ft;
            best_score = score;
        }
    }

    let confidence = if best_score == 0 {
        0.2
    } else {
        (best_score as f32 / 8.0).min(0.95)
    };

    Inference {
        field_type: best,
        canonical_name: title_case(raw_name),
        description: describe(best, raw_name),
        confidence,
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(field_type: FieldType, raw_name: &str) -> String {
    let hint = match field_type {
        FieldType::Currency => " (an amount, e.g. $500,000)",
        FieldType::Date => " (a date, e.g. January 1, 2025)",
        FieldType::PersonName => " (a person's full name)",
        FieldType::CompanyName => " (a company or organization name)",
        FieldType::Address => " (a full mailing address)",
        FieldType::Email => " (an email address)",
        FieldType::Phone => " (a phone number)",
        FieldType::Number => " (a number)",
        FieldType::Text | FieldType::Other => "",
    };
    format!("Please provide: {}{}", raw_name.to_lowercase(), hint)
}

/// The always-available inference strategy.
pub struct KeywordInference;

#[async_trait]
impl TypeInference for KeywordInference {
    async fn infer(&self, raw_name: &str, context_before: &str, context_after: &str) -> Inference {
        infer_keywords(raw_name, context_before, context_after)
    }
}

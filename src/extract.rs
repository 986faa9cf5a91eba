//! Placeholder extraction.
//!
//! Scans raw document text for bracket-delimited spans `[...]`, trims the
//! captured names, and records a bounded context window around the first
//! occurrence of each distinct name. Output order is first-occurrence order,
//! which later becomes the default disambiguation order for the scorer and
//! the "what to ask next" proposal.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::model::Placeholder;

/// Characters of context captured on each side of an occurrence. Tunable:
/// widening it gives the inference engine more signal at the cost of noise.
pub const CONTEXT_WINDOW_CHARS: usize = 150;

fn bracket_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Non-overlapping spans whose content contains no nested brackets.
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("bracket pattern compiles"))
}

/// Find all distinct placeholders in `text`, in first-occurrence order.
///
/// Names are trimmed; empty names are discarded. Deduplication is
/// case-insensitive on the trimmed name, and only the first occurrence's
/// context window is kept.
pub fn find_placeholders(text: &str) -> Vec<Placeholder> {
    find_placeholders_with_window(text, CONTEXT_WINDOW_CHARS)
}

/// As [`find_placeholders`] with an explicit context window width.
pub fn find_placeholders_with_window(text: &str, window: usize) -> Vec<Placeholder> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut placeholders = Vec::new();

    for caps in bracket_regex().captures_iter(text) {
        let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        let key = name.to_lowercase();
        if !seen.insert(key) {
            continue;
        }

        let span = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        let before = context_before(text, span.0, window);
        let after = context_after(text, span.1, window);

        debug!(name, "found placeholder");
        placeholders.push(Placeholder::new(name, before, after));
    }

    debug!(count = placeholders.len(), "extraction complete");
    placeholders
}

/// Up to `window` characters of text ending at byte offset `at`, clipped to
/// the document start. Char-based so multi-byte text never splits.
fn context_before(text: &str, at: usize, window: usize) -> String {
    let mut chars: Vec<char> = text[..at].chars().rev().take(window).collect();
    chars.reverse();
    chars.into_iter().collect()
}

/// Up to `window` characters of text starting at byte offset `from`,
/// clipped to the document end.
fn context_after(text: &str, from: usize, window: usize) -> String {
    text[from..].chars().take(window).collect()
}

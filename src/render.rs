//! Render gate: final substitution of collected values.
//!
//! Fails closed: rendering is refused outright while any placeholder is
//! unfilled. Substitution is keyed by exact raw name, so every bracket
//! occurrence in the source corresponds 1:1 to a collected value.
//!
//! Word-processing editors routinely split a placeholder's bracket text
//! across several formatting runs, so replacement works on each
//! paragraph's merged run text: the full `[raw_name]` is located in the
//! merged text, replaced, and the result written into the paragraph's
//! first run with the remaining runs emptied. Content outside bracket
//! spans is preserved verbatim.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::document::TemplateDocument;
use crate::error::{AssistError, AssistResult};
use crate::model::Placeholder;

/// Completion summary for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderSummary {
    /// Raw names whose bracket text was found and replaced at least once.
    pub replaced: Vec<String>,
    /// Raw names whose bracket text could not be located verbatim.
    /// Non-fatal; the rest of the document still renders.
    pub warnings: Vec<String>,
}

/// Substitute collected values into the document.
///
/// Precondition: every placeholder is filled, else
/// [`AssistError::IncompleteFields`] with the unfilled names and no output
/// document is produced.
pub fn render_document(
    document: &TemplateDocument,
    placeholders: &[Placeholder],
) -> AssistResult<(TemplateDocument, RenderSummary)> {
    let unfilled: Vec<String> = placeholders
        .iter()
        .filter(|p| !p.filled)
        .map(|p| p.raw_name.clone())
        .collect();
    if !unfilled.is_empty() {
        return Err(AssistError::IncompleteFields { unfilled });
    }

    let values: BTreeMap<&str, &str> = placeholders
        .iter()
        .filter_map(|p| p.value.as_deref().map(|v| (p.raw_name.as_str(), v)))
        .collect();

    let mut output = document.clone();
    let mut replaced: BTreeMap<&str, bool> = values.keys().map(|k| (*k, false)).collect();

    output.for_each_paragraph_mut(|paragraph| {
        let mut merged: String = paragraph.runs.iter().map(|r| r.text.as_str()).collect();
        let mut changed = false;

        for (name, value) in &values {
            let needle = format!("[{}]", name);
            if merged.contains(&needle) {
                merged = merged.replace(&needle, value);
                changed = true;
                if let Some(flag) = replaced.get_mut(*name) {
                    *flag = true;
                }
                debug!(field = %name, "replaced placeholder");
            }
        }

        if changed {
            // Collapse the merged text into the first run, keeping its
            // formatting; the other runs carry no text afterwards.
            for run in &mut paragraph.runs {
                run.text.clear();
            }
            match paragraph.runs.first_mut() {
                Some(first) => first.text = merged,
                None => paragraph.runs.push(crate::document::Run::new(merged)),
            }
        }
    });

    let mut summary = RenderSummary::default();
    for (name, was_replaced) in replaced {
        if was_replaced {
            summary.replaced.push(name.to_string());
        } else {
            warn!(field = %name, "placeholder bracket text not found in document");
            summary.warnings.push(name.to_string());
        }
    }

    Ok((output, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, Cell, Paragraph, Run, Table};
    use crate::extract::find_placeholders;

    fn filled(name: &str, value: &str) -> Placeholder {
        let mut p = Placeholder::new(name, "", "");
        p.fill(value);
        p
    }

    #[test]
    fn test_render_replaces_all_values_in_position() {
        let text = "Between [Investor Name] and [Company Name], dated [Date].";
        let document = TemplateDocument::from_plain_text(text);
        let placeholders = vec![
            filled("Investor Name", "Jane Doe"),
            filled("Company Name", "ABC Corp"),
            filled("Date", "2025-01-01"),
        ];

        let (output, summary) = render_document(&document, &placeholders).unwrap();
        let rendered = output.plain_text();

        assert_eq!(rendered, "Between Jane Doe and ABC Corp, dated 2025-01-01.");
        assert!(!rendered.contains('['));
        assert!(!rendered.contains(']'));
        assert_eq!(summary.replaced.len(), 3);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_render_fails_closed_with_unfilled_names() {
        let document = TemplateDocument::from_plain_text("dated [Date]");
        let date = Placeholder::new("Date", "", "");

        let result = render_document(&document, &[filled("Company Name", "ABC"), date]);

        match result {
            Err(AssistError::IncompleteFields { unfilled }) => {
                assert_eq!(unfilled, vec!["Date".to_string()]);
            }
            other => panic!("expected IncompleteFields, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_placeholder_split_across_runs_is_merged() {
        let document = TemplateDocument {
            blocks: vec![Block::Paragraph(Paragraph {
                runs: vec![
                    Run::styled("Between [Inve", "regular"),
                    Run::styled("stor Name]", "bold"),
                    Run::new(" and others."),
                ],
            })],
        };

        let (output, summary) =
            render_document(&document, &[filled("Investor Name", "Jane Doe")]).unwrap();

        let Block::Paragraph(p) = &output.blocks[0] else {
            panic!("expected paragraph");
        };
        // Merged text lands in the first run; the rest are emptied but kept.
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.runs[0].text, "Between Jane Doe and others.");
        assert_eq!(p.runs[0].style.as_deref(), Some("regular"));
        assert_eq!(p.runs[1].text, "");
        assert_eq!(p.runs[2].text, "");
        assert_eq!(summary.replaced, vec!["Investor Name".to_string()]);
    }

    #[test]
    fn test_unlocatable_placeholder_is_a_warning_not_an_abort() {
        let document = TemplateDocument::from_plain_text("No brackets here at all.");

        let (output, summary) = render_document(&document, &[filled("Ghost Field", "x")]).unwrap();

        assert_eq!(output.plain_text(), "No brackets here at all.");
        assert_eq!(summary.warnings, vec!["Ghost Field".to_string()]);
        assert!(summary.replaced.is_empty());
    }

    #[test]
    fn test_table_cells_render() {
        let document = TemplateDocument {
            blocks: vec![Block::Table(Table {
                rows: vec![vec![Cell::from_text("Signed by"), Cell::from_text("[Signatory]")]],
            })],
        };

        let (output, _) = render_document(&document, &[filled("Signatory", "Jane Doe")]).unwrap();

        assert_eq!(output.plain_text(), "Signed by\nJane Doe");
    }

    #[test]
    fn test_repeated_occurrences_all_replaced() {
        let document =
            TemplateDocument::from_plain_text("[Company Name] agrees that [Company Name] shall pay.");

        let (output, _) = render_document(&document, &[filled("Company Name", "ABC Corp")]).unwrap();

        assert_eq!(output.plain_text(), "ABC Corp agrees that ABC Corp shall pay.");
    }

    #[test]
    fn test_rendered_document_extracts_zero_placeholders() {
        let text = "Between [Investor Name] and [Company Name], dated [Date].";
        let document = TemplateDocument::from_plain_text(text);
        let placeholders = vec![
            filled("Investor Name", "Jane Doe"),
            filled("Company Name", "ABC Corp"),
            filled("Date", "2025-01-01"),
        ];

        let (output, _) = render_document(&document, &placeholders).unwrap();

        assert!(find_placeholders(&output.plain_text()).is_empty());
    }

    #[test]
    fn test_no_output_on_gate_failure() {
        let document = TemplateDocument::from_plain_text("[A] [B]");
        let unfilled_b = Placeholder::new("B", "", "");
        let result = render_document(&document, &[filled("A", "1"), unfilled_b]);
        assert!(result.is_err());
    }
}

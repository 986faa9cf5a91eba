//! Minimal run-based template document model.
//!
//! Stands in for the external word-processing format: a document is a
//! sequence of paragraphs and tables, and each paragraph is a sequence of
//! formatting-carrying runs. A placeholder's bracket text may be split
//! across runs by the source editor, which is why rendering works on merged
//! run text (see [`crate::render`]).

use serde::{Deserialize, Serialize};

/// A styled fragment of paragraph text. The style tag is opaque to the
/// resolution engine; it exists so substitution can be shown to preserve
/// run boundaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(style.into()),
        }
    }
}

/// One paragraph: an ordered sequence of runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::new(text)],
        }
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A table: rows of cells, each cell holding paragraphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

/// One table cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            paragraphs: vec![Paragraph::from_text(text)],
        }
    }
}

/// Top-level block element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// An uploaded template document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub blocks: Vec<Block>,
}

impl TemplateDocument {
    /// Build a single-paragraph-per-line document from plain text.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            blocks: text.lines().map(|l| Block::Paragraph(Paragraph::from_text(l))).collect(),
        }
    }

    /// Flatten all textual content into a newline-joined string: body
    /// paragraphs and table cells in document order, blank ones skipped.
    /// This is the text the extractor and inference engine operate on.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => {
                    let text = p.text();
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
                Block::Table(table) => {
                    for row in &table.rows {
                        for cell in row {
                            for p in &cell.paragraphs {
                                let text = p.text();
                                if !text.trim().is_empty() {
                                    parts.push(text);
                                }
                            }
                        }
                    }
                }
            }
        }
        parts.join("\n")
    }

    /// Visit every paragraph mutably, including those inside table cells,
    /// in document order.
    pub fn for_each_paragraph_mut<F: FnMut(&mut Paragraph)>(&mut self, mut f: F) {
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(p) => f(p),
                Block::Table(table) => {
                    for row in &mut table.rows {
                        for cell in row {
                            for p in &mut cell.paragraphs {
                                f(p);
                            }
                        }
                    }
                }
            }
        }
    }
}

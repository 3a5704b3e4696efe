//! Table cell types.

use super::Attributes;
use serde::{Deserialize, Serialize};

/// One cell of a table matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TableCell {
    /// A text cell
    Text {
        text: String,
        #[serde(default)]
        attributes: Attributes,
    },
    /// A cell holding only an image
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

impl TableCell {
    /// Create a text cell with no attributes.
    pub fn text(text: impl Into<String>) -> Self {
        TableCell::Text {
            text: text.into(),
            attributes: Attributes::default(),
        }
    }

    /// Create an empty text cell.
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Create an image cell.
    pub fn image(src: impl Into<String>, alt: Option<String>) -> Self {
        TableCell::Image {
            src: src.into(),
            alt,
        }
    }

    /// Text of a text cell; `None` for image cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TableCell::Text { text, .. } => Some(text),
            TableCell::Image { .. } => None,
        }
    }

    /// Check if the cell is an empty text cell.
    pub fn is_empty(&self) -> bool {
        matches!(self, TableCell::Text { text, .. } if text.is_empty())
    }

    /// Plain-text rendering, with images as `[IMAGE: src]`.
    pub fn display_text(&self) -> String {
        match self {
            TableCell::Text { text, .. } => text.clone(),
            TableCell::Image { src, .. } => format!("[IMAGE: {}]", src),
        }
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::empty()
    }
}

/// Outcome of running the table cleaner over a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Cleaned and rectangular
    Cleaned,
    /// Ragged; passed through untouched
    Dirty,
    /// A single row; not really a table
    NotTable,
}

/// Check that every row has the same number of cells.
pub fn is_rectangular(matrix: &[Vec<TableCell>]) -> bool {
    match matrix.first() {
        Some(first) => matrix.iter().all(|row| row.len() == first.len()),
        None => true,
    }
}

/// Render a matrix as plain strings.
pub fn matrix_strings(matrix: &[Vec<TableCell>]) -> Vec<Vec<String>> {
    matrix
        .iter()
        .map(|row| row.iter().map(TableCell::display_text).collect())
        .collect()
}

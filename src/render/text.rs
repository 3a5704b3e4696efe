//! Plain text rendering for document trees.

use crate::error::Result;
use crate::model::DocumentTree;

use super::flatten::{unnest, FlatContent};
use super::markdown::format_table;
use super::RenderOptions;

/// Convert a document tree to plain text.
///
/// Titles stand on their own between blank lines; tables keep the pipe layout.
pub fn to_text(tree: &DocumentTree, options: &RenderOptions) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();

    for entry in unnest(tree) {
        match entry.content {
            FlatContent::Title(title) => {
                lines.push(String::new());
                lines.push(title.trim().to_string());
                lines.push(String::new());
            }
            FlatContent::Text(text) | FlatContent::TextSmall(text) => lines.push(text.to_string()),
            FlatContent::Table(rows) => lines.extend(format_table(rows)),
            FlatContent::Image(image) if options.include_images => {
                lines.push(format!("[IMAGE: {}{}]", options.image_path_prefix, image.src));
            }
            FlatContent::Image(_) => {}
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

//! Markdown rendering for document trees.

use crate::error::Result;
use crate::model::{CellValue, DocumentTree, ImageRef};

use super::flatten::{unnest, FlatContent};
use super::{ExtractionStats, RenderOptions};

/// Convert a document tree to Markdown.
pub fn to_markdown(tree: &DocumentTree, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(tree)
}

/// Convert a document tree to Markdown with statistics.
pub fn to_markdown_with_stats(
    tree: &DocumentTree,
    options: &RenderOptions,
) -> Result<(String, ExtractionStats)> {
    let renderer = MarkdownRenderer::new(options.clone());
    let content = renderer.render(tree)?;
    let mut stats = ExtractionStats::from_tree(tree);
    stats.count_text(&content);
    Ok((content, stats))
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a tree to Markdown.
    pub fn render(&self, tree: &DocumentTree) -> Result<String> {
        let mut lines: Vec<String> = Vec::new();

        for entry in unnest(tree) {
            match entry.content {
                FlatContent::Title(title) => lines.push(self.heading(title, entry.depth)),
                FlatContent::Text(text) => lines.push(self.escape(text)),
                FlatContent::TextSmall(text) if self.options.small_text_tags => {
                    lines.push(format!("<sub>{}</sub>", self.escape(text)));
                }
                FlatContent::TextSmall(text) => lines.push(self.escape(text)),
                FlatContent::Table(rows) => lines.extend(format_table(rows)),
                FlatContent::Image(image) if self.options.include_images => {
                    lines.push(self.image(image));
                }
                FlatContent::Image(_) => {}
            }
        }

        Ok(lines.join("\n").trim().to_string())
    }

    fn heading(&self, title: &str, depth: usize) -> String {
        let level = (depth + 1).clamp(1, self.options.max_heading_level.max(1) as usize);
        format!("{} {}", "#".repeat(level), title.trim())
    }

    fn image(&self, image: &ImageRef) -> String {
        let alt = image.alt.as_deref().unwrap_or("");
        format!("![{}]({}{})", alt, self.options.image_path_prefix, image.src)
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Single-line cell text: no non-breaking spaces, whitespace collapsed.
pub fn clean_cell_content(text: &str) -> String {
    text.replace('\u{a0}', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A padded pipe table surrounded by blank lines.
///
/// The first row is treated as the header.
pub fn format_table(rows: &[Vec<CellValue>]) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    let cleaned: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| clean_cell_content(&c.display_text())).collect())
        .collect();

    let mut widths: Vec<usize> = Vec::new();
    for row in &cleaned {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut lines = vec![String::new()];
    for (i, row) in cleaned.iter().enumerate() {
        let padded: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, cell)| format!("{:<width$}", cell, width = widths[j]))
            .collect();
        lines.push(format!("| {} |", padded.join(" | ")));

        if i == 0 {
            let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
            lines.push(format!("|{}|", separator.join("|")));
        }
    }
    lines.push(String::new());
    lines
}

/// Escape special Markdown characters.
/// Only escape characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Content, ContentItem, DocumentNode, TreeMetadata};

    fn sample_tree() -> DocumentTree {
        let mut intro = DocumentNode::introduction();
        intro
            .contents
            .insert(0, Content::Item(ContentItem::Text("Annual report.".into())));

        let mut item = DocumentNode::new("Item 1A. Risk Factors", "item", 1);
        item.contents
            .insert(3, Content::Item(ContentItem::Text("Risks *exist*.".into())));
        item.contents
            .insert(4, Content::Item(ContentItem::TextSmall("Unaudited.".into())));
        item.contents.insert(
            5,
            Content::Item(ContentItem::Table(vec![
                vec![CellValue::Text("Year".into()), CellValue::Text("Sales".into())],
                vec![CellValue::Text("2023".into()), CellValue::Text("$10\u{a0}".into())],
            ])),
        );
        let mut part = DocumentNode::new("Part I", "part", 0);
        part.contents.insert(2, Content::Section(item));

        let mut tree = DocumentTree::new(TreeMetadata::new("test"));
        tree.document.insert(-1, intro);
        tree.document.insert(1, part);
        tree
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_format_table() {
        let lines = format_table(&[
            vec![CellValue::Text("Year".into()), CellValue::Text("Net\nSales".into())],
            vec![CellValue::Text("2023".into()), CellValue::Text("$10".into())],
        ]);
        assert_eq!(
            lines,
            vec![
                "",
                "| Year | Net Sales |",
                "|------|-----------|",
                "| 2023 | $10       |",
                "",
            ]
        );
    }

    #[test]
    fn test_render_tree() {
        let md = to_markdown(&sample_tree(), &RenderOptions::default()).unwrap();
        assert!(md.starts_with("Annual report.\n# Part I\n## Item 1A. Risk Factors"));
        assert!(md.contains("Risks *exist*."));
        assert!(md.contains("<sub>Unaudited.</sub>"));
        assert!(md.contains("| 2023 | $10   |"));
        assert!(!md.contains("introduction"));
    }

    #[test]
    fn test_render_options() {
        let options = RenderOptions::new()
            .with_max_heading(1)
            .with_small_text_tags(false)
            .with_escape(true);
        let md = to_markdown(&sample_tree(), &options).unwrap();
        assert!(md.contains("\n# Item 1A. Risk Factors"));
        assert!(md.contains("Risks \\*exist\\*."));
        assert!(md.contains("\nUnaudited."));
    }

    #[test]
    fn test_markdown_stats() {
        let (_, stats) = to_markdown_with_stats(&sample_tree(), &RenderOptions::default()).unwrap();
        assert_eq!(stats.section_count, 2);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.max_depth, 1);
        assert!(stats.word_count > 0);
    }
}

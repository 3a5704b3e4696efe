//! Rendering module for converting document trees to various output formats.

mod flatten;
mod json;
mod markdown;
mod options;
mod stats;
mod text;

pub use flatten::{unnest, FlatContent, FlatEntry};
pub use json::{instructions_to_json, to_json, JsonFormat};
pub use markdown::{clean_cell_content, format_table, to_markdown, to_markdown_with_stats, MarkdownRenderer};
pub use options::RenderOptions;
pub use stats::ExtractionStats;
pub use text::to_text;

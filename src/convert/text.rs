//! Plain-text document converter.

use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::DocumentTree;
use crate::parser::{text_to_instructions, ParseOptions};
use crate::structure::convert_instructions_to_tree;

use super::DocumentConverter;

/// Convert plain-text bytes in the declared encoding into a document tree.
pub fn text_to_tree(bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
    let groups = text_to_instructions(bytes, &options.encoding)?;
    Ok(convert_instructions_to_tree(
        groups,
        options.mapping.as_ref(),
        options.split_headers,
        SourceFormat::Text.parser_name(),
    ))
}

/// Plain-text document converter.
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    /// Create a new text converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for TextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn parse_bytes(&self, bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
        text_to_tree(bytes, options)
    }
}

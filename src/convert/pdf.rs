//! PDF document converter implementation.

use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::DocumentTree;
use crate::parser::{pdf_to_instructions, LopdfBackend, ParseOptions, TextObjectSource};
use crate::structure::{convert_instructions_to_tree, MappingDict};

use super::DocumentConverter;

/// Build a document tree from any text-object source.
///
/// Without a mapping, headings are ranked by font size alone.
pub fn pdf_source_to_tree<S: TextObjectSource + ?Sized>(
    source: &S,
    options: &ParseOptions,
) -> Result<DocumentTree> {
    let groups = pdf_to_instructions(source, options)?;
    let default_mapping = MappingDict::font_size_only();
    let mapping = options.mapping.as_ref().unwrap_or(&default_mapping);
    Ok(convert_instructions_to_tree(
        groups,
        Some(mapping),
        options.split_headers,
        SourceFormat::Pdf.parser_name(),
    ))
}

/// Parse PDF bytes and build their document tree.
pub fn pdf_to_tree(bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    log::debug!(
        "PDF {} with {} page(s)",
        backend.version(),
        backend.page_count()
    );
    pdf_source_to_tree(&backend, options)
}

/// PDF document converter.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    _private: (),
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn parse_bytes(&self, bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
        pdf_to_tree(bytes, options)
    }
}

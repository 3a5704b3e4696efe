//! Document converters with a plugin architecture for multiple formats.
//!
//! A converter turns the bytes of one source format into a
//! [`DocumentTree`]; the registry dispatches on file extension and renders
//! the tree into the requested output format.
//!
//! # Example
//!
//! ```no_run
//! use docstruct::convert::{ConverterRegistry, ConvertOptions, OutputFormat};
//! use std::path::Path;
//!
//! fn main() -> docstruct::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let options = ConvertOptions::new().with_format(OutputFormat::Markdown);
//!
//!     let result = registry.convert(Path::new("10k.htm"), &options)?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod html;
mod pdf;
mod text;

pub use html::{decode_html_bytes, html_to_tree, HtmlConverter};
pub use pdf::{pdf_source_to_tree, pdf_to_tree, PdfConverter};
pub use text::{text_to_tree, TextConverter};

use crate::error::{Error, Result};
use crate::model::DocumentTree;
use crate::parser::ParseOptions;
use crate::render::{
    to_json, to_markdown, to_markdown_with_stats, to_text, ExtractionStats, JsonFormat,
    RenderOptions,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Producer and classifier options
    pub parse: ParseOptions,

    /// Rendering options
    pub render: RenderOptions,

    /// Whether to collect statistics during conversion
    pub collect_stats: bool,

    /// Output format
    pub output_format: OutputFormat,

    /// Layout of JSON output
    pub json_format: JsonFormat,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}

/// Output format for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The serialized document tree
    #[default]
    Json,

    /// Markdown
    Markdown,

    /// Plain text
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
        }
    }

    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Text => "text/plain",
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered content
    pub content: String,

    /// The document tree the content was rendered from
    pub tree: DocumentTree,

    /// Extraction statistics (if collected)
    pub stats: Option<ExtractionStats>,

    /// MIME type of the output
    pub mime_type: &'static str,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(content: String, tree: DocumentTree) -> Self {
        Self {
            content,
            tree,
            stats: None,
            mime_type: OutputFormat::Json.mime_type(),
        }
    }

    /// Render a tree according to the options.
    pub fn render(tree: DocumentTree, options: &ConvertOptions) -> Result<Self> {
        let format = options.output_format;
        let (content, stats) = match format {
            OutputFormat::Json => (to_json(&tree, options.json_format)?, None),
            OutputFormat::Markdown if options.collect_stats => {
                let (content, stats) = to_markdown_with_stats(&tree, &options.render)?;
                (content, Some(stats))
            }
            OutputFormat::Markdown => (to_markdown(&tree, &options.render)?, None),
            OutputFormat::Text => (to_text(&tree, &options.render)?, None),
        };
        let stats = match stats {
            Some(stats) => Some(stats),
            None if options.collect_stats => {
                let mut stats = ExtractionStats::from_tree(&tree);
                stats.count_text(&content);
                Some(stats)
            }
            None => None,
        };

        let mut result = ConvertResult::new(content, tree).with_mime_type(format.mime_type());
        result.stats = stats;
        Ok(result)
    }

    /// Set extraction statistics.
    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Set MIME type.
    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Build the document tree from bytes.
    fn parse_bytes(&self, bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree>;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let bytes = std::fs::read(path)?;
        self.convert_bytes(&bytes, options)
    }

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let tree = self.parse_bytes(bytes, &options.parse)?;
        ConvertResult::render(tree, options)
    }

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the HTML, PDF and text converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(HtmlConverter::new()));
        registry.register(Arc::new(PdfConverter::new()));
        registry.register(Arc::new(TextConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters.insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name.insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// Convert a file using the appropriate converter.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Other("File has no extension".into()))?;

        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        log::debug!("converting {} with the {} converter", path.display(), converter.name());
        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("No converter for extension: {}", ext)))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_stats(true)
            .with_format(OutputFormat::Text)
            .with_json_format(JsonFormat::Compact)
            .with_parse_options(ParseOptions::new().with_encoding("latin1"));

        assert!(options.collect_stats);
        assert_eq!(options.output_format, OutputFormat::Text);
        assert_eq!(options.json_format, JsonFormat::Compact);
        assert_eq!(options.parse.encoding, "latin1");
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("pdf"));
        assert!(registry.supports("HTM"));
        assert!(registry.supports("txt"));
        assert!(!registry.supports("docx"));
        assert_eq!(
            registry.supported_extensions(),
            vec!["htm", "html", "pdf", "text", "txt", "xhtml"]
        );
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.get_by_extension("html").unwrap().name(), "html");
        assert!(registry.get_by_name("PDF").is_some());
        assert!(registry.get_by_name("docx").is_none());
    }

    #[test]
    fn test_render_formats() {
        let registry = ConverterRegistry::with_defaults();
        let html = b"<p><b>Overview</b></p><p>We make widgets.</p>";

        let json = registry
            .convert_bytes(html, "html", &ConvertOptions::new())
            .unwrap();
        assert_eq!(json.mime_type, "application/json");
        assert!(json.content.contains("\"Overview\""));

        let md = registry
            .convert_bytes(
                html,
                "html",
                &ConvertOptions::new()
                    .with_format(OutputFormat::Markdown)
                    .with_stats(true),
            )
            .unwrap();
        assert_eq!(md.content, "# Overview\nWe make widgets.");
        assert_eq!(md.stats.unwrap().section_count, 1);

        let text = registry
            .convert_bytes(html, "htm", &ConvertOptions::new().with_format(OutputFormat::Text))
            .unwrap();
        assert_eq!(text.mime_type, "text/plain");
        assert!(text.stats.is_none());
    }

    #[test]
    fn test_unknown_extension() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry
            .convert_bytes(b"", "docx", &ConvertOptions::new())
            .is_err());
        assert!(registry
            .convert(Path::new("no_extension"), &ConvertOptions::new())
            .is_err());
    }
}

//! # docstruct
//!
//! Document structure extraction for Rust.
//!
//! This library turns rendered HTML, PDF text objects and plain text into
//! one canonical tree of titled sections holding paragraphs, small print,
//! tables and images. No input format marks its headings explicitly, so
//! they are recovered from formatting signals (font size, weight,
//! indentation, capitalization) and optional regex mapping rules.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docstruct::{convert_file, render, ParseOptions};
//!
//! fn main() -> docstruct::Result<()> {
//!     let tree = convert_file("10k.htm", &ParseOptions::default())?;
//!
//!     let markdown = render::to_markdown(&tree, &render::RenderOptions::default())?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Producers** ([`parser`]): format-specific instruction streams
//! - **Merger and table cleaner** ([`structure`]): line-level units, tidy tables
//! - **Level classifier** ([`structure`]): heading levels from fonts, attributes and rules
//! - **Hierarchy builder** ([`structure`]): the output [`DocumentTree`]
//! - **Rendering** ([`render`]): JSON, Markdown and plain text

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use convert::{
    html_to_tree, pdf_to_tree, text_to_tree, ConvertOptions, ConvertResult, ConverterRegistry,
    DocumentConverter, OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use error::{Error, Result};
pub use model::{
    Attributes, CellValue, Content, ContentItem, DocumentNode, DocumentTree, Instruction,
    InstructionGroup, Level, LevelClass, TitleQuery,
};
pub use parser::{ErrorMode, ParseOptions};
pub use render::{JsonFormat, RenderOptions};
pub use structure::{MappingDict, MappingRule};

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Build the tree of a document whose format is already known.
pub fn convert_with_format(
    bytes: &[u8],
    format: SourceFormat,
    options: &ParseOptions,
) -> Result<DocumentTree> {
    match format {
        SourceFormat::Html => {
            let html = convert::decode_html_bytes(bytes, &options.encoding);
            Ok(html_to_tree(&html, options))
        }
        SourceFormat::Pdf => pdf_to_tree(bytes, options),
        SourceFormat::Text => text_to_tree(bytes, options),
    }
}

/// Run only the producer for a format and return its grouped instructions.
///
/// Nothing is merged or classified; this is the stream the rest of the
/// pipeline starts from.
pub fn extract_instructions(
    bytes: &[u8],
    format: SourceFormat,
    options: &ParseOptions,
) -> Result<Vec<InstructionGroup>> {
    match format {
        SourceFormat::Html => {
            let html = convert::decode_html_bytes(bytes, &options.encoding);
            Ok(parser::html_to_instructions(&html))
        }
        SourceFormat::Pdf => {
            let backend = parser::LopdfBackend::load_bytes(bytes)?;
            parser::pdf_to_instructions(&backend, options)
        }
        SourceFormat::Text => parser::text_to_instructions(bytes, &options.encoding),
    }
}

/// Detect the format of in-memory bytes and build their tree.
///
/// # Example
///
/// ```no_run
/// use docstruct::{convert_bytes, ParseOptions};
///
/// let tree = convert_bytes(b"<p><b>Overview</b></p>", &ParseOptions::default()).unwrap();
/// assert_eq!(tree.metadata.parser_name, "html2dict");
/// ```
pub fn convert_bytes(bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
    let format = detect_format_from_bytes(bytes)?;
    convert_with_format(bytes, format, options)
}

/// Detect the format of a file and build its tree.
///
/// # Example
///
/// ```no_run
/// use docstruct::{convert_file, MappingDict, ParseOptions};
///
/// let mapping = MappingDict::from_file("mapping.json").unwrap();
/// let tree = convert_file("filing.pdf", &ParseOptions::new().with_mapping(mapping)).unwrap();
/// println!("{} top-level sections", tree.sections().count());
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<DocumentTree> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;
    let bytes = std::fs::read(path)?;
    log::debug!("converting {} as {}", path.display(), format);
    convert_with_format(&bytes, format, options)
}

/// Convert many files, in parallel unless the options say otherwise.
///
/// Results come back in input order; one failing file does not stop the others.
pub fn convert_many<P>(paths: &[P], options: &ParseOptions) -> Vec<(PathBuf, Result<DocumentTree>)>
where
    P: AsRef<Path> + Sync,
{
    let convert_one = |path: &P| {
        let path = path.as_ref();
        (path.to_path_buf(), convert_file(path, options))
    };
    if options.parallel {
        paths.par_iter().map(convert_one).collect()
    } else {
        paths.iter().map(convert_one).collect()
    }
}

/// Builder for converting documents and rendering the result.
///
/// # Example
///
/// ```no_run
/// use docstruct::Docstruct;
///
/// let markdown = Docstruct::new()
///     .with_mapping_json(r#"[{"class": "item", "pattern": "item\\s*(\\d+[a-z]?)", "level": 1}]"#)?
///     .with_encoding("windows-1252")
///     .parse_file("10k.txt")?
///     .to_markdown()?;
/// # Ok::<(), docstruct::Error>(())
/// ```
pub struct Docstruct {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Docstruct {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Use a mapping dict.
    pub fn with_mapping(mut self, mapping: MappingDict) -> Self {
        self.parse_options = self.parse_options.with_mapping(mapping);
        self
    }

    /// Parse and use a JSON mapping dict.
    pub fn with_mapping_json(self, json: &str) -> Result<Self> {
        Ok(self.with_mapping(MappingDict::from_json(json)?))
    }

    /// Declare the encoding of text input.
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.parse_options = self.parse_options.with_encoding(label);
        self
    }

    /// Keep header runs inside their groups.
    pub fn without_header_split(mut self) -> Self {
        self.parse_options = self.parse_options.with_split_headers(false);
        self
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Convert a file.
    pub fn parse_file<P: AsRef<Path>>(self, path: P) -> Result<DocstructResult> {
        let tree = convert_file(path, &self.parse_options)?;
        Ok(DocstructResult {
            tree,
            render_options: self.render_options,
        })
    }

    /// Convert in-memory bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<DocstructResult> {
        let tree = convert_bytes(data, &self.parse_options)?;
        Ok(DocstructResult {
            tree,
            render_options: self.render_options,
        })
    }
}

impl Default for Docstruct {
    fn default() -> Self {
        Self::new()
    }
}

/// A converted document with the render options to use.
pub struct DocstructResult {
    /// The document tree
    pub tree: DocumentTree,
    render_options: RenderOptions,
}

impl DocstructResult {
    /// Convert to Markdown.
    pub fn to_markdown(&self) -> Result<String> {
        render::to_markdown(&self.tree, &self.render_options)
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.tree, &self.render_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.tree, format)
    }

    /// Get the tree.
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }
}

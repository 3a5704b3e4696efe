//! Conversion options and configuration.

use crate::structure::MappingDict;

/// Options for converting a document into a tree.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Heading rules or the font-size-only directive
    pub mapping: Option<MappingDict>,

    /// Encoding label for plain-text input (WHATWG label, e.g. "utf-8", "windows-1252")
    pub encoding: String,

    /// Split a leading header run off groups that mix it with body text
    pub split_headers: bool,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether batch conversion may use parallel processing
    pub parallel: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapping dict.
    pub fn with_mapping(mut self, mapping: MappingDict) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Set the declared encoding of plain-text input.
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Enable or disable header splitting.
    pub fn with_split_headers(mut self, split: bool) -> Self {
        self.split_headers = split;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            mapping: None,
            encoding: "utf-8".to_string(),
            split_headers: true,
            error_mode: ErrorMode::Strict,
            parallel: true,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}

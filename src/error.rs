//! Error types for docstruct.

use std::io;
use thiserror::Error;

/// Result type alias for docstruct operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting document structure.
///
/// Inputs that parse but carry no content are not errors: they produce an
/// empty tree. Only unreadable input ends up here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input format could not be recognized.
    #[error("Unknown document format")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The declared text encoding is not a known label.
    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The input bytes are not valid in the declared encoding.
    #[error("Failed to decode input as {0}")]
    Decode(String),

    /// A mapping rule carries a pattern that does not compile.
    #[error("Invalid mapping rule '{class}': {message}")]
    InvalidRule { class: String, message: String },

    /// The mapping document itself is malformed.
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    /// Error during rendering (Markdown, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidMapping(err.to_string())
    }
}

//! Input format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Source formats understood by the instruction producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// HTML or XHTML markup
    Html,
    /// PDF document
    Pdf,
    /// Plain text in a caller-declared encoding
    Text,
}

impl SourceFormat {
    /// Name used for `metadata.parser_name` in the output tree.
    pub fn parser_name(&self) -> &'static str {
        match self {
            SourceFormat::Html => "html2dict",
            SourceFormat::Pdf => "pdf2dict",
            SourceFormat::Text => "txt2dict",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "htm" | "html" | "xhtml" => Some(SourceFormat::Html),
            "pdf" => Some(SourceFormat::Pdf),
            "txt" | "text" => Some(SourceFormat::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SourceFormat::Html => "HTML",
            SourceFormat::Pdf => "PDF",
            SourceFormat::Text => "Text",
        };
        write!(f, "{}", name)
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3;

/// How far into the input to look for markup.
const SNIFF_LEN: usize = 1024;

const MARKUP_PREFIXES: &[&str] = &["<!doctype html", "<html", "<?xml", "<head", "<body"];

/// Detect the format of a file.
///
/// PDF magic bytes always win. Otherwise a known extension decides, so a
/// `.txt` filing that opens with `<PAGE>` stays plain text. Markup is only
/// sniffed when the extension is missing or unknown.
///
/// # Example
/// ```no_run
/// use docstruct::detect::{detect_format_from_path, SourceFormat};
///
/// let format = detect_format_from_path("filing.htm").unwrap();
/// assert_eq!(format, SourceFormat::Html);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = Vec::with_capacity(SNIFF_LEN);
    reader
        .by_ref()
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut header)?;

    if is_pdf_bytes(&header) {
        return Ok(SourceFormat::Pdf);
    }

    if let Some(format) = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFormat::from_extension)
    {
        return Ok(format);
    }

    if looks_like_markup(&header) {
        return Ok(SourceFormat::Html);
    }
    Err(Error::UnknownFormat)
}

/// Detect the format of in-memory content.
///
/// Anything that is neither a PDF nor recognizable markup is treated as
/// plain text, so this only fails on empty input.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if data.is_empty() {
        return Err(Error::UnknownFormat);
    }
    Ok(sniff(data).unwrap_or(SourceFormat::Text))
}

fn sniff(data: &[u8]) -> Option<SourceFormat> {
    if is_pdf_bytes(data) {
        return Some(SourceFormat::Pdf);
    }
    if looks_like_markup(data) {
        return Some(SourceFormat::Html);
    }
    None
}

/// Extract the PDF version from a header (e.g. "1.7" from "%PDF-1.7").
pub fn pdf_version(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Check if a version string is valid.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}

fn looks_like_markup(data: &[u8]) -> bool {
    let window = &data[..data.len().min(SNIFF_LEN)];
    let text = String::from_utf8_lossy(window);
    // Skip a BOM and leading whitespace before the first tag.
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    let lower = trimmed.to_ascii_lowercase();
    if MARKUP_PREFIXES.iter().any(|p| lower.starts_with(p)) || lower.contains("<html") {
        return true;
    }
    // A fragment that opens with an element tag.
    let mut chars = lower.chars();
    chars.next() == Some('<') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(detect_format_from_bytes(data).unwrap(), SourceFormat::Pdf);
        assert_eq!(pdf_version(data).unwrap(), "1.7");
    }

    #[test]
    fn test_detect_html() {
        let data = b"  <!DOCTYPE html><html><body>Hi</body></html>";
        assert_eq!(detect_format_from_bytes(data).unwrap(), SourceFormat::Html);

        let data = b"<?xml version=\"1.0\"?><html xmlns=\"http://www.w3.org/1999/xhtml\">";
        assert_eq!(detect_format_from_bytes(data).unwrap(), SourceFormat::Html);
    }

    #[test]
    fn test_detect_fragment() {
        let data = b"<p><b>Overview</b></p>";
        assert_eq!(detect_format_from_bytes(data).unwrap(), SourceFormat::Html);
        assert_eq!(detect_format_from_bytes(b"<- arrow").unwrap(), SourceFormat::Text);
    }

    #[test]
    fn test_detect_text_fallback() {
        let data = b"ITEM 1. BUSINESS\n----------------\n";
        assert_eq!(detect_format_from_bytes(data).unwrap(), SourceFormat::Text);
    }

    #[test]
    fn test_path_extension_beats_markup_sniffing() {
        let dir = tempfile::tempdir().unwrap();

        let text = dir.path().join("filing.txt");
        std::fs::write(&text, "<PAGE>\nITEM 1. BUSINESS\n").unwrap();
        assert_eq!(detect_format_from_path(&text).unwrap(), SourceFormat::Text);

        let unknown = dir.path().join("filing.dat");
        std::fs::write(&unknown, "<html><body>Hi</body></html>").unwrap();
        assert_eq!(detect_format_from_path(&unknown).unwrap(), SourceFormat::Html);

        let pdf = dir.path().join("report.txt");
        std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();
        assert_eq!(detect_format_from_path(&pdf).unwrap(), SourceFormat::Pdf);

        let plain = dir.path().join("notes.dat");
        std::fs::write(&plain, "just words").unwrap();
        assert!(matches!(
            detect_format_from_path(&plain),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_empty() {
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
        assert!(matches!(
            pdf_version(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceFormat::from_extension("HTM"), Some(SourceFormat::Html));
        assert_eq!(SourceFormat::from_extension("pdf"), Some(SourceFormat::Pdf));
        assert_eq!(SourceFormat::from_extension("txt"), Some(SourceFormat::Text));
        assert_eq!(SourceFormat::from_extension("docx"), None);
    }

    #[test]
    fn test_detect_from_path_uses_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain words").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), SourceFormat::Text);

        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body><p>x</p></body></html>").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), SourceFormat::Html);
    }
}

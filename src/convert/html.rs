//! HTML document converter.

use encoding_rs::{Encoding, UTF_8};

use crate::detect::SourceFormat;
use crate::error::Result;
use crate::model::DocumentTree;
use crate::parser::{html_to_instructions, ParseOptions};
use crate::structure::convert_instructions_to_tree;

use super::DocumentConverter;

/// Decode HTML bytes.
///
/// A byte-order mark wins, then the declared encoding label; unknown labels
/// fall back to UTF-8. Malformed sequences are replaced rather than rejected.
pub fn decode_html_bytes(bytes: &[u8], label: &str) -> String {
    let declared = Encoding::for_label(label.trim().as_bytes()).unwrap_or(UTF_8);
    let (text, used, had_errors) = declared.decode(bytes);
    if had_errors {
        log::warn!("replaced malformed {} sequences in HTML input", used.name());
    }
    text.into_owned()
}

/// Convert an HTML string into a document tree.
pub fn html_to_tree(html: &str, options: &ParseOptions) -> DocumentTree {
    let groups = html_to_instructions(html);
    convert_instructions_to_tree(
        groups,
        options.mapping.as_ref(),
        options.split_headers,
        SourceFormat::Html.parser_name(),
    )
}

/// HTML document converter.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    _private: (),
}

impl HtmlConverter {
    /// Create a new HTML converter.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for HtmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn name(&self) -> &str {
        "html"
    }

    fn parse_bytes(&self, bytes: &[u8], options: &ParseOptions) -> Result<DocumentTree> {
        let html = decode_html_bytes(bytes, &options.encoding);
        Ok(html_to_tree(&html, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::MappingDict;

    #[test]
    fn test_html_converter_extensions() {
        let converter = HtmlConverter::new();
        assert!(converter.supports_extension("HTM"));
        assert!(converter.supports_extension("xhtml"));
        assert!(!converter.supports_extension("pdf"));
        assert_eq!(converter.name(), "html");
    }

    #[test]
    fn test_decode_html_bytes() {
        assert_eq!(decode_html_bytes(b"<p>caf\xe9</p>", "windows-1252"), "<p>caf\u{e9}</p>");
        assert_eq!(decode_html_bytes(b"\xef\xbb\xbf<p>x</p>", "windows-1252"), "<p>x</p>");
        assert_eq!(decode_html_bytes(b"<p>x</p>", "bogus"), "<p>x</p>");
    }

    #[test]
    fn test_html_to_tree_with_rules() {
        let mapping = MappingDict::from_json(
            r#"[{"class": "item", "pattern": "item\\s*(\\d+[a-z]?)", "level": 0}]"#,
        )
        .unwrap();
        let options = ParseOptions::new().with_mapping(mapping);
        let tree = html_to_tree(
            "<p><b>Item 1. Business</b></p><p>Widgets.</p><p><b>Item 1A. Risk Factors</b></p><p>Risks.</p>",
            &options,
        );

        assert_eq!(tree.metadata.parser_name, "html2dict");
        let titles: Vec<_> = tree
            .sections()
            .map(|(_, n)| n.standardized_title.clone().unwrap_or_default())
            .collect();
        assert_eq!(titles, vec!["item1", "item1a"]);
    }
}

//! The hierarchical output tree.
//!
//! Serialized form:
//!
//! ```text
//! { "metadata": { "parser_name": ..., "version": ... },
//!   "document": { "-1": { "title": "introduction", "class": "introduction", ... },
//!                 "<index>": { "title", "standardized_title"?, "class", "contents"? } } }
//! ```
//!
//! Keys are the position of the instruction group that produced the entry.

use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key of the synthetic introduction node under the document root.
pub const INTRODUCTION_KEY: i64 = -1;

/// Class and title of the synthetic introduction node.
pub const INTRODUCTION_CLASS: &str = "introduction";

/// Output metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMetadata {
    /// Which producer built the tree (e.g. "html2dict")
    pub parser_name: String,
    /// Library version
    pub version: String,
}

impl TreeMetadata {
    /// Metadata for the given producer and the current crate version.
    pub fn new(parser_name: impl Into<String>) -> Self {
        Self {
            parser_name: parser_name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A converted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Producer name and version
    pub metadata: TreeMetadata,
    /// Top-level sections keyed by group index
    pub document: BTreeMap<i64, DocumentNode>,
}

/// A titled section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Heading text as it appeared in the document
    pub title: String,
    /// Canonical title from a mapping rule (e.g. "item1a")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standardized_title: Option<String>,
    /// Rule class, `predicted_header` or `introduction`
    pub class: String,
    /// Child sections and content items keyed by group index
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contents: BTreeMap<i64, Content>,
    /// Hierarchy level the node was built at; not serialized
    #[serde(skip)]
    pub level: i32,
}

impl DocumentNode {
    /// Create an empty section.
    pub fn new(title: impl Into<String>, class: impl Into<String>, level: i32) -> Self {
        Self {
            title: title.into(),
            standardized_title: None,
            class: class.into(),
            contents: BTreeMap::new(),
            level,
        }
    }

    /// The synthetic node holding content that precedes the first heading.
    pub fn introduction() -> Self {
        Self::new(INTRODUCTION_CLASS, INTRODUCTION_CLASS, 0)
    }

    /// Iterate child sections in document order.
    pub fn sections(&self) -> impl Iterator<Item = (i64, &DocumentNode)> {
        self.contents.iter().filter_map(|(k, c)| match c {
            Content::Section(node) => Some((*k, node)),
            Content::Item(_) => None,
        })
    }

    /// Iterate content items in document order.
    pub fn items(&self) -> impl Iterator<Item = (i64, &ContentItem)> {
        self.contents.iter().filter_map(|(k, c)| match c {
            Content::Item(item) => Some((*k, item)),
            Content::Section(_) => None,
        })
    }

    /// Concatenated `text` items directly under this node.
    pub fn body_text(&self) -> String {
        self.items()
            .filter_map(|(_, item)| match item {
                ContentItem::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An entry in a section's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// A nested section
    Section(DocumentNode),
    /// A leaf content item
    Item(ContentItem),
}

/// A leaf content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    /// Ordinary text
    #[serde(rename = "text")]
    Text(String),
    /// Small print
    #[serde(rename = "textsmall")]
    TextSmall(String),
    /// Table rows
    #[serde(rename = "table")]
    Table(Vec<Vec<CellValue>>),
    /// An image
    #[serde(rename = "image")]
    Image(ImageRef),
}

/// Image source and alternate text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A table cell in the output tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Cell text
    Text(String),
    /// An image-only cell
    Image { image: ImageRef },
}

impl CellValue {
    /// Plain-text rendering, with images as `[IMAGE: src]`.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Image { image } => format!("[IMAGE: {}]", image.src),
        }
    }
}

/// What to look for with [`DocumentTree::find_sections`].
#[derive(Debug, Clone)]
pub enum TitleQuery<'a> {
    /// Case-insensitive equality with the title or standardized title
    Exact(&'a str),
    /// Case-insensitive regex anchored at the start of the title or standardized title
    Pattern(&'a str),
}

impl DocumentTree {
    /// Create an empty tree.
    pub fn new(metadata: TreeMetadata) -> Self {
        Self {
            metadata,
            document: BTreeMap::new(),
        }
    }

    /// The introduction node, if present.
    pub fn introduction(&self) -> Option<&DocumentNode> {
        self.document.get(&INTRODUCTION_KEY)
    }

    /// Top-level sections other than the introduction.
    pub fn sections(&self) -> impl Iterator<Item = (i64, &DocumentNode)> {
        self.document
            .iter()
            .filter(|(k, _)| **k != INTRODUCTION_KEY)
            .map(|(k, n)| (*k, n))
    }

    /// Find sections by title, depth first, in document order.
    ///
    /// Returns `(key, node)` pairs where `key` is the node's key in its
    /// parent. `class` further restricts matches (case-insensitive).
    pub fn find_sections(
        &self,
        query: TitleQuery<'_>,
        class: Option<&str>,
    ) -> Result<Vec<(i64, &DocumentNode)>> {
        let matcher: Box<dyn Fn(&str) -> bool> = match query {
            TitleQuery::Exact(title) => {
                let wanted = title.to_lowercase();
                Box::new(move |candidate: &str| candidate.to_lowercase() == wanted)
            }
            TitleQuery::Pattern(pattern) => {
                let re = RegexBuilder::new(&format!("^(?:{})", pattern))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| Error::Other(format!("invalid title pattern: {}", e)))?;
                Box::new(move |candidate: &str| re.is_match(candidate))
            }
        };
        let class = class.map(str::to_lowercase);

        let mut results = Vec::new();
        for (key, node) in &self.document {
            collect_matches(*key, node, &*matcher, class.as_deref(), &mut results);
        }
        Ok(results)
    }
}

fn collect_matches<'a>(
    key: i64,
    node: &'a DocumentNode,
    matcher: &dyn Fn(&str) -> bool,
    class: Option<&str>,
    out: &mut Vec<(i64, &'a DocumentNode)>,
) {
    let title_match = matcher(&node.title)
        || node
            .standardized_title
            .as_deref()
            .map(|t| matcher(t))
            .unwrap_or(false);
    let class_match = class.map_or(true, |c| node.class.to_lowercase() == c);
    if title_match && class_match {
        out.push((key, node));
    }
    for (child_key, child) in node.sections() {
        collect_matches(child_key, child, matcher, class, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DocumentTree {
        let mut tree = DocumentTree::new(TreeMetadata::new("html2dict"));
        tree.document.insert(INTRODUCTION_KEY, DocumentNode::introduction());

        let mut item1 = DocumentNode::new("Item 1. Business", "item", 0);
        item1.standardized_title = Some("item1".to_string());
        item1
            .contents
            .insert(1, Content::Item(ContentItem::Text("We sell things.".to_string())));

        let mut risk = DocumentNode::new("Risk Factors", "predicted_header", 1);
        risk.contents
            .insert(3, Content::Item(ContentItem::TextSmall("(1) footnote".to_string())));
        item1.contents.insert(2, Content::Section(risk));

        tree.document.insert(0, item1);
        tree
    }

    #[test]
    fn test_serialization_shape() {
        let tree = sample_tree();
        let value = serde_json::to_value(&tree).unwrap();

        let intro = &value["document"]["-1"];
        assert_eq!(intro["class"], "introduction");
        assert!(intro.get("contents").is_none());
        assert!(intro.get("standardized_title").is_none());

        let item1 = &value["document"]["0"];
        assert_eq!(item1["standardized_title"], "item1");
        assert_eq!(item1["contents"]["1"]["text"], "We sell things.");
        assert_eq!(item1["contents"]["2"]["title"], "Risk Factors");
        assert_eq!(item1["contents"]["2"]["contents"]["3"]["textsmall"], "(1) footnote");
        assert!(item1.get("level").is_none());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let tree = sample_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: DocumentTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back.document.len(), 2);
        assert!(matches!(
            back.document[&0].contents[&2],
            Content::Section(_)
        ));
        assert!(matches!(
            back.document[&0].contents[&1],
            Content::Item(ContentItem::Text(_))
        ));
    }

    #[test]
    fn test_table_cells_serialize() {
        let item = ContentItem::Table(vec![vec![
            CellValue::Text("Revenue".to_string()),
            CellValue::Image {
                image: ImageRef {
                    src: "logo.png".to_string(),
                    alt: None,
                },
            },
        ]]);
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"table":[["Revenue",{"image":{"src":"logo.png"}}]]}"#);
    }

    #[test]
    fn test_find_sections_exact() {
        let tree = sample_tree();
        let found = tree
            .find_sections(TitleQuery::Exact("ITEM1"), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 0);

        let found = tree
            .find_sections(TitleQuery::Exact("risk factors"), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 2);
    }

    #[test]
    fn test_find_sections_pattern_and_class() {
        let tree = sample_tree();
        let found = tree
            .find_sections(TitleQuery::Pattern(r"item\s*1"), Some("ITEM"))
            .unwrap();
        assert_eq!(found.len(), 1);

        let found = tree
            .find_sections(TitleQuery::Pattern("risk"), Some("item"))
            .unwrap();
        assert!(found.is_empty());

        assert!(tree
            .find_sections(TitleQuery::Pattern("("), None)
            .is_err());
    }

    #[test]
    fn test_body_text() {
        let tree = sample_tree();
        assert_eq!(tree.document[&0].body_text(), "We sell things.");
        assert_eq!(tree.sections().count(), 1);
        assert!(tree.introduction().is_some());
    }
}

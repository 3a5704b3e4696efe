//! Depth-first flattening of a document tree.

use crate::model::{CellValue, Content, ContentItem, DocumentNode, DocumentTree, ImageRef, INTRODUCTION_KEY};

/// What a flattened entry holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlatContent<'a> {
    Title(&'a str),
    Text(&'a str),
    TextSmall(&'a str),
    Table(&'a [Vec<CellValue>]),
    Image(&'a ImageRef),
}

impl FlatContent<'_> {
    /// Entry kind as used in the serialized tree.
    pub fn kind(&self) -> &'static str {
        match self {
            FlatContent::Title(_) => "title",
            FlatContent::Text(_) => "text",
            FlatContent::TextSmall(_) => "textsmall",
            FlatContent::Table(_) => "table",
            FlatContent::Image(_) => "image",
        }
    }
}

/// One entry of a flattened tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEntry<'a> {
    /// Key of the node or item in its parent
    pub key: i64,
    /// Nesting depth; top-level titles are at 0, their contents at 1
    pub depth: usize,
    pub content: FlatContent<'a>,
}

/// Flatten a tree in document order.
///
/// The introduction's own title is omitted; its contents are kept.
pub fn unnest(tree: &DocumentTree) -> Vec<FlatEntry<'_>> {
    let mut entries = Vec::new();
    for (key, node) in &tree.document {
        visit_node(*key, node, 0, &mut entries);
    }
    entries
}

fn visit_node<'a>(key: i64, node: &'a DocumentNode, depth: usize, out: &mut Vec<FlatEntry<'a>>) {
    if key != INTRODUCTION_KEY {
        out.push(FlatEntry {
            key,
            depth,
            content: FlatContent::Title(&node.title),
        });
    }
    for (child_key, content) in &node.contents {
        match content {
            Content::Section(child) => visit_node(*child_key, child, depth + 1, out),
            Content::Item(item) => out.push(FlatEntry {
                key: *child_key,
                depth: depth + 1,
                content: match item {
                    ContentItem::Text(text) => FlatContent::Text(text),
                    ContentItem::TextSmall(text) => FlatContent::TextSmall(text),
                    ContentItem::Table(rows) => FlatContent::Table(rows),
                    ContentItem::Image(image) => FlatContent::Image(image),
                },
            }),
        }
    }
}

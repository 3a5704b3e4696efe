//! Statistics over a converted document.

use serde::{Deserialize, Serialize};

use crate::model::DocumentTree;

use super::flatten::{unnest, FlatContent};

/// Counts collected from a document tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of sections (the introduction excluded)
    pub section_count: u32,

    /// Number of text items
    pub text_count: u32,

    /// Number of small-print items
    pub textsmall_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of images
    pub image_count: u32,

    /// Deepest section nesting (0 = top-level sections only)
    pub max_depth: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the entries of a tree. Word counts are left at zero.
    pub fn from_tree(tree: &DocumentTree) -> Self {
        let mut stats = Self::new();
        for entry in unnest(tree) {
            match entry.content {
                FlatContent::Title(_) => {
                    stats.section_count += 1;
                    stats.max_depth = stats.max_depth.max(entry.depth as u32);
                }
                FlatContent::Text(_) => stats.text_count += 1,
                FlatContent::TextSmall(_) => stats.textsmall_count += 1,
                FlatContent::Table(_) => stats.table_count += 1,
                FlatContent::Image(_) => stats.image_count += 1,
            }
        }
        stats
    }

    /// Add word and character counts from text.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.section_count += other.section_count;
        self.text_count += other.text_count;
        self.textsmall_count += other.textsmall_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}

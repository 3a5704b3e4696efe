//! JSON rendering for document trees and instruction dumps.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DocumentTree, InstructionGroup};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document tree to JSON.
pub fn to_json(tree: &DocumentTree, format: JsonFormat) -> Result<String> {
    serialize(tree, format)
}

/// Dump instruction groups as JSON, one array per group.
pub fn instructions_to_json(groups: &[InstructionGroup], format: JsonFormat) -> Result<String> {
    serialize(groups, format)
}

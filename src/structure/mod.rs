//! Format-independent structure recovery.
//!
//! Instruction groups from any producer pass through header splitting,
//! level classification and tree building here.

mod classify;
mod cleaner;
mod hierarchy;
mod mapping;
mod merge;

pub use classify::{
    determine_levels, determine_predicted_header_levels, normalize_header_text,
    split_header_groups, FontHistogram, BIG_SCRIPT_RATIO, BODY_DOMINANCE,
};
pub use cleaner::clean_table;
pub use hierarchy::{build_tree, NON_TEXT_TITLE};
pub use mapping::{MappingDict, MappingRule};
pub use merge::{
    finalize_group, is_empty_group, is_empty_text, merge_instructions, remove_leading_empty,
    EMPTY_CHARS,
};

use crate::model::{DocumentTree, InstructionGroup, TreeMetadata};

/// Classify instruction groups and build their tree.
pub fn convert_instructions_to_tree(
    groups: Vec<InstructionGroup>,
    mapping: Option<&MappingDict>,
    split_headers: bool,
    parser_name: &str,
) -> DocumentTree {
    let groups = if split_headers {
        split_header_groups(groups)
    } else {
        groups
    };
    let levels = determine_levels(&groups, mapping);
    build_tree(&groups, &levels, TreeMetadata::new(parser_name))
}

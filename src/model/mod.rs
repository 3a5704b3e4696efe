//! Data model shared by every stage of the pipeline.
//!
//! Producers emit [`Instruction`]s grouped into [`InstructionGroup`]s; the
//! classifier attaches a [`Level`] to each group; the hierarchy builder
//! folds the leveled stream into a [`DocumentTree`].

mod instruction;
mod level;
mod table;
mod tree;

pub use instruction::{group_text, Attributes, Instruction, InstructionGroup};
pub use level::{Level, LevelClass, SMALL_TEXT_LEVEL, TEXT_LEVEL};
pub use table::{is_rectangular, matrix_strings, TableCell, TableStatus};
pub use tree::{
    CellValue, Content, ContentItem, DocumentNode, DocumentTree, ImageRef, TitleQuery,
    TreeMetadata, INTRODUCTION_CLASS, INTRODUCTION_KEY,
};

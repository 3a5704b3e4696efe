//! Instruction producers: HTML, PDF text objects and plain text.

mod backend;
mod html;
mod options;
mod pdf;
mod strings;
mod style;
mod table_builder;
mod text;

pub use backend::{decode_text_simple, LopdfBackend};
pub use html::{html_to_instructions, HtmlProducer, MarkupElement};
pub use options::{ErrorMode, ParseOptions};
pub use pdf::{
    assign_lines, font_name_attributes, pdf_to_instructions, BoundingBox, TextObject,
    TextObjectSource,
};
pub use strings::{check_string_style, StringStyle};
pub use style::{normalize_to_px, parse_style_attribute, ScopeSignal, StyleTracker};
pub use table_builder::{merge_cell_instructions, parse_span, table_to_groups, TableBuilder};
pub use text::{decode_bytes, lines_to_instructions, text_to_instructions};

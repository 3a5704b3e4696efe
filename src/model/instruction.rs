//! Instructions: the flat, styled content stream every producer emits.

use serde::{Deserialize, Serialize};

use super::table::TableCell;

/// Formatting attributes attached to a text or image instruction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Bold weight (tag, style or font name)
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic or oblique
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Underlined
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    /// Horizontally centered
    #[serde(skip_serializing_if = "is_false")]
    pub text_center: bool,
    /// Every cased character is upper case
    #[serde(skip_serializing_if = "is_false")]
    pub all_caps: bool,
    /// Title Case Words (stop words excepted)
    #[serde(skip_serializing_if = "is_false")]
    pub proper_case: bool,
    /// Flattened single-row table
    #[serde(skip_serializing_if = "is_false")]
    pub fake_table: bool,
    /// Font size in px (HTML) or points (PDF)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Left indentation in px or columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f32>,
    /// Hyperlink target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Attributes {
    /// Create empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set underline.
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// Set centered.
    pub fn with_center(mut self, center: bool) -> Self {
        self.text_center = center;
        self
    }

    /// Set font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set left indent.
    pub fn with_left_indent(mut self, indent: f32) -> Self {
        self.left_indent = Some(indent);
        self
    }

    /// True if any attribute that can mark a heading is set.
    pub fn has_header_signal(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.text_center
            || self.all_caps
            || self.fake_table
            || self.proper_case
    }

    /// The attributes that decide whether two adjacent runs can be merged.
    pub fn merge_key(&self) -> (bool, bool, bool, bool, Option<u32>) {
        (
            self.bold,
            self.italic,
            self.underline,
            self.text_center,
            self.font_size.map(f32::to_bits),
        )
    }

    /// Fold another run's attributes into this one.
    ///
    /// Flags accumulate, valued attributes take the later value when present.
    pub fn absorb(&mut self, other: &Attributes) {
        self.bold |= other.bold;
        self.italic |= other.italic;
        self.underline |= other.underline;
        self.text_center |= other.text_center;
        self.all_caps |= other.all_caps;
        self.proper_case |= other.proper_case;
        self.fake_table |= other.fake_table;
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.left_indent.is_some() {
            self.left_indent = other.left_indent;
        }
        if other.href.is_some() {
            self.href = other.href.clone();
        }
    }
}

/// One styled atomic content unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Instruction {
    /// A run of text
    Text {
        content: String,
        #[serde(default)]
        attributes: Attributes,
    },
    /// An image reference
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default)]
        attributes: Attributes,
    },
    /// A table matrix
    Table {
        matrix: Vec<Vec<TableCell>>,
        cleaned: bool,
    },
}

impl Instruction {
    /// Create a text instruction.
    pub fn text(content: impl Into<String>, attributes: Attributes) -> Self {
        Instruction::Text {
            content: content.into(),
            attributes,
        }
    }

    /// Create a text instruction with no attributes.
    pub fn plain(content: impl Into<String>) -> Self {
        Self::text(content, Attributes::default())
    }

    /// Create an image instruction.
    pub fn image(src: impl Into<String>, alt: Option<String>, attributes: Attributes) -> Self {
        Instruction::Image {
            src: src.into(),
            alt,
            attributes,
        }
    }

    /// Text content, if this is a text instruction.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Instruction::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Attributes of text and image instructions.
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Instruction::Text { attributes, .. } | Instruction::Image { attributes, .. } => {
                Some(attributes)
            }
            Instruction::Table { .. } => None,
        }
    }

    /// Mutable attributes of text and image instructions.
    pub fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Instruction::Text { attributes, .. } | Instruction::Image { attributes, .. } => {
                Some(attributes)
            }
            Instruction::Table { .. } => None,
        }
    }

    /// Check if this is a text instruction.
    pub fn is_text(&self) -> bool {
        matches!(self, Instruction::Text { .. })
    }

    /// Check if this is an image instruction.
    pub fn is_image(&self) -> bool {
        matches!(self, Instruction::Image { .. })
    }

    /// Check if this is a table instruction.
    pub fn is_table(&self) -> bool {
        matches!(self, Instruction::Table { .. })
    }

    /// True for text instructions that are empty after trimming.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Instruction::Text { content, .. } if content.trim().is_empty())
    }
}

/// The instructions composing one output line, paragraph, table or image.
pub type InstructionGroup = Vec<Instruction>;

/// Concatenated text of every text instruction in a group.
pub fn group_text(group: &[Instruction]) -> String {
    group.iter().filter_map(Instruction::as_text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_builder() {
        let attrs = Attributes::new().with_bold(true).with_font_size(16.0);
        assert!(attrs.bold);
        assert_eq!(attrs.font_size, Some(16.0));
        assert!(attrs.has_header_signal());
        assert!(!Attributes::new().with_font_size(30.0).has_header_signal());
    }

    #[test]
    fn test_absorb() {
        let mut a = Attributes::new().with_bold(true).with_font_size(12.0);
        let b = Attributes::new().with_italic(true).with_font_size(14.0);
        a.absorb(&b);
        assert!(a.bold && a.italic);
        assert_eq!(a.font_size, Some(14.0));
    }

    #[test]
    fn test_blank_text() {
        assert!(Instruction::plain(" \n").is_blank_text());
        assert!(!Instruction::plain("x").is_blank_text());
        assert!(!Instruction::image("a.png", None, Attributes::new()).is_blank_text());
    }

    #[test]
    fn test_group_text() {
        let group = vec![
            Instruction::plain("Item "),
            Instruction::image("x.gif", None, Attributes::new()),
            Instruction::plain("1."),
        ];
        assert_eq!(group_text(&group), "Item 1.");
    }

    #[test]
    fn test_instruction_serialization() {
        let inst = Instruction::text("Hello", Attributes::new().with_bold(true));
        let json = serde_json::to_string(&inst).unwrap();
        assert_eq!(
            json,
            r#"{"type":"text","content":"Hello","attributes":{"bold":true}}"#
        );
    }
}

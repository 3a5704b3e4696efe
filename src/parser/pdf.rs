//! PDF instruction producer.
//!
//! Consumes positioned text objects page by page and clusters them into
//! lines by their bottom coordinate. The PDF library itself sits behind
//! [`TextObjectSource`].

use crate::error::Result;
use crate::model::{Attributes, Instruction, InstructionGroup};
use crate::parser::options::{ErrorMode, ParseOptions};
use crate::structure::merge_instructions;

/// Fraction of the larger font size two objects' bottoms may differ by
/// and still share a line.
const LINE_TOLERANCE: f32 = 0.5;

/// Axis-aligned box in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl BoundingBox {
    /// Create a box from its edges.
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }
}

/// One text object as reported by a PDF backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TextObject {
    /// Decoded text
    pub text: String,
    /// Base font name, e.g. `ABCDEF+Helvetica-Bold`
    pub font_name: String,
    /// Font size with the text rendering transform applied
    pub font_size: Option<f32>,
    /// Position on the page
    pub bbox: BoundingBox,
}

impl TextObject {
    /// Create a text object.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: Option<f32>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            bbox,
        }
    }
}

/// Access to the text objects of a paged document.
pub trait TextObjectSource {
    /// Number of pages.
    fn page_count(&self) -> usize;

    /// Text objects of a page (0-based) in content-stream order.
    fn page_objects(&self, page: usize) -> Result<Vec<TextObject>>;
}

impl TextObjectSource for Vec<Vec<TextObject>> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_objects(&self, page: usize) -> Result<Vec<TextObject>> {
        Ok(self.get(page).cloned().unwrap_or_default())
    }
}

/// Bold / italic flags from the last `-`-separated part of a font name.
pub fn font_name_attributes(font_name: &str) -> (bool, bool) {
    let Some((_, suffix)) = font_name.rsplit_once('-') else {
        return (false, false);
    };
    let suffix = suffix.to_lowercase();
    let bold = ["bold", "black", "heavy"].iter().any(|w| suffix.contains(w));
    let italic = ["italic", "oblique"].iter().any(|w| suffix.contains(w));
    (bold, italic)
}

#[derive(Debug)]
struct Run {
    text: String,
    font_name: String,
    font_size: f32,
    bbox: BoundingBox,
}

impl Run {
    fn into_instruction(self) -> Instruction {
        let (bold, italic) = font_name_attributes(&self.font_name);
        let attributes = Attributes {
            bold,
            italic,
            font_size: Some(self.font_size),
            ..Attributes::default()
        };
        Instruction::text(self.text, attributes)
    }
}

/// Cluster a page's objects into lines.
///
/// An object joins the current line when its bottom is within half the
/// larger font size of the previous object's bottom. Within a line, an
/// object with the same font name and size as the run before it extends
/// that run.
pub fn assign_lines(objects: Vec<TextObject>) -> Vec<InstructionGroup> {
    let mut lines = Vec::new();
    let mut line: Vec<Run> = Vec::new();
    let mut previous: Option<(f32, f32)> = None;

    for object in objects {
        let Some(font_size) = object.font_size else {
            continue;
        };

        if let Some((prev_bottom, prev_size)) = previous {
            let tolerance = prev_size.max(font_size) * LINE_TOLERANCE;
            if (prev_bottom - object.bbox.bottom).abs() > tolerance {
                flush_line(&mut line, &mut lines);
            }
        }
        previous = Some((object.bbox.bottom, font_size));

        match line.last_mut() {
            Some(run) if run.font_name == object.font_name && run.font_size == font_size => {
                run.text.push_str(&object.text);
                run.bbox = run.bbox.union(&object.bbox);
            }
            _ => line.push(Run {
                text: object.text,
                font_name: object.font_name,
                font_size,
                bbox: object.bbox,
            }),
        }
    }
    flush_line(&mut line, &mut lines);
    lines
}

fn flush_line(line: &mut Vec<Run>, lines: &mut Vec<InstructionGroup>) {
    if line.is_empty() {
        return;
    }
    let instructions: Vec<Instruction> = line.drain(..).map(Run::into_instruction).collect();
    let merged = merge_instructions(instructions);
    if merged.iter().any(|inst| !inst.is_blank_text()) {
        lines.push(merged);
    }
}

/// Produce instruction groups for every page of a document.
///
/// Lines never span pages. In [`ErrorMode::Lenient`] a page whose text
/// cannot be read is logged and skipped.
pub fn pdf_to_instructions<S: TextObjectSource + ?Sized>(
    source: &S,
    options: &ParseOptions,
) -> Result<Vec<InstructionGroup>> {
    let mut groups = Vec::new();
    for page in 0..source.page_count() {
        let objects = match source.page_objects(page) {
            Ok(objects) => objects,
            Err(e) if options.error_mode == ErrorMode::Lenient => {
                log::warn!("skipping page {}: {}", page + 1, e);
                continue;
            }
            Err(e) => return Err(e),
        };
        let lines = assign_lines(objects);
        log::trace!("page {}: {} line(s)", page + 1, lines.len());
        groups.extend(lines);
    }
    log::debug!("pdf producer emitted {} groups", groups.len());
    Ok(groups)
}

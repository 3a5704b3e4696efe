//! Plain-text instruction producer.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{Error, Result};
use crate::model::{Attributes, Instruction, InstructionGroup};
use crate::parser::strings::check_string_style;

/// Columns a tab counts for in the leading indent.
const TAB_SIZE: f32 = 4.0;

/// Decode bytes strictly with a WHATWG encoding label.
///
/// A byte-order mark overrides the label. Malformed input is an error, not
/// replaced.
pub fn decode_bytes<'a>(bytes: &'a [u8], label: &str) -> Result<Cow<'a, str>> {
    let (encoding, payload) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let encoding = Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| Error::UnknownEncoding(label.to_string()))?;
            (encoding, bytes)
        }
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(payload)
        .ok_or_else(|| Error::Decode(format!("input is not valid {}", encoding.name())))
}

/// Width of the leading whitespace run.
fn left_indent(line: &str) -> f32 {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_SIZE } else { 1.0 })
        .sum()
}

/// A line made only of dashes (and spaces) underlines the line above it.
fn is_dash_line(line: &str) -> bool {
    let mut chars = line.chars().filter(|c| !c.is_whitespace()).peekable();
    chars.peek().is_some() && chars.all(|c| c == '-')
}

/// One line of text, or `None` for a blank separator.
fn line_instruction(line: &str) -> Option<Instruction> {
    let content = line.trim();
    if content.is_empty() {
        return None;
    }
    let style = check_string_style(content);
    let indent = left_indent(line);
    let attributes = Attributes {
        all_caps: style.all_caps,
        proper_case: style.proper_case,
        left_indent: (indent > 0.0).then_some(indent),
        ..Attributes::default()
    };
    Some(Instruction::text(content, attributes))
}

/// Split text into per-line groups; blank lines become empty groups.
///
/// Dash underlines are resolved here: the marker line becomes a separator
/// and the paragraph above it (back to the previous blank line) is made bold.
pub fn split_lines(text: &str) -> Vec<Vec<Instruction>> {
    let mut lines: Vec<Vec<Instruction>> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');
        if is_dash_line(raw) {
            let previous = lines
                .iter_mut()
                .rev()
                .skip_while(|line| line.is_empty())
                .take_while(|line| !line.is_empty());
            for inst in previous.flatten() {
                if let Some(attrs) = inst.attributes_mut() {
                    attrs.bold = true;
                }
            }
            lines.push(Vec::new());
            continue;
        }
        lines.push(line_instruction(raw).into_iter().collect());
    }
    lines
}

/// Join consecutive non-empty lines into paragraphs.
///
/// Continuation lines get a single leading space. Separators are dropped.
pub fn combine_wraparound(lines: Vec<Vec<Instruction>>) -> Vec<InstructionGroup> {
    let mut paragraphs = Vec::new();
    let mut current: InstructionGroup = Vec::new();

    for mut line in lines {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            if let Some(Instruction::Text { content, .. }) = line.first_mut() {
                content.insert(0, ' ');
            }
        }
        current.extend(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Produce instruction groups from already-decoded text.
pub fn lines_to_instructions(text: &str) -> Vec<InstructionGroup> {
    let groups = combine_wraparound(split_lines(text));
    log::debug!("text producer emitted {} groups", groups.len());
    groups
}

/// Decode plain-text bytes and produce their instruction groups.
pub fn text_to_instructions(bytes: &[u8], encoding: &str) -> Result<Vec<InstructionGroup>> {
    let text = decode_bytes(bytes, encoding)?;
    Ok(lines_to_instructions(&text))
}

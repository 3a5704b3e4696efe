//! Collapse adjacent same-style runs into single instructions.

use crate::model::{Instruction, InstructionGroup};

/// Characters treated as whitespace when deciding whether text is empty.
pub const EMPTY_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\u{a0}'];

/// True if the text has no content besides whitespace and non-breaking spaces.
pub fn is_empty_text(text: &str) -> bool {
    text.trim_matches(EMPTY_CHARS).is_empty()
}

fn is_barrier(inst: &Instruction) -> bool {
    !inst.is_text()
}

fn same_style(a: &Instruction, b: &Instruction) -> bool {
    match (a.attributes(), b.attributes()) {
        (Some(x), Some(y)) => x.merge_key() == y.merge_key(),
        _ => false,
    }
}

fn append_text(target: &mut Instruction, text: &str) {
    if let Instruction::Text { content, .. } = target {
        content.push_str(text);
    }
}

/// Merge a line's instructions.
///
/// A run that is empty after trimming is appended to the run before it.
/// A run whose style matches the previous one is concatenated onto it.
/// Otherwise the nearest earlier run with the same style absorbs every run
/// after it. Images and tables never merge and stop the backward search.
pub fn merge_instructions(instructions: Vec<Instruction>) -> Vec<Instruction> {
    if instructions.len() <= 1 {
        return instructions;
    }

    let mut result: Vec<Instruction> = Vec::with_capacity(instructions.len());
    for current in instructions {
        let Some(prev) = result.last_mut() else {
            result.push(current);
            continue;
        };
        if is_barrier(&current) || is_barrier(prev) {
            result.push(current);
            continue;
        }

        let text = current.as_text().unwrap_or_default();
        if is_empty_text(text) || same_style(prev, &current) {
            append_text(prev, text);
            continue;
        }

        let target = result
            .iter()
            .rposition(|earlier| is_barrier(earlier) || same_style(earlier, &current))
            .filter(|&j| !is_barrier(&result[j]));

        match target {
            Some(j) => {
                let folded: String = result
                    .drain(j + 1..)
                    .filter_map(|inst| inst.as_text().map(str::to_string))
                    .collect();
                append_text(&mut result[j], &folded);
                append_text(&mut result[j], text);
            }
            None => result.push(current),
        }
    }
    result
}

/// Drop leading instructions that are blank text.
pub fn remove_leading_empty(mut instructions: Vec<Instruction>) -> Vec<Instruction> {
    match instructions.iter().position(|inst| !inst.is_blank_text()) {
        Some(i) => {
            instructions.drain(..i);
            instructions
        }
        None => Vec::new(),
    }
}

/// True if a group has no image, table or non-blank text.
pub fn is_empty_group(instructions: &[Instruction]) -> bool {
    instructions.iter().all(|inst| match inst {
        Instruction::Text { content, .. } => is_empty_text(content),
        _ => false,
    })
}

/// Finish a line: trim leading blanks, merge runs, strip a lone text run.
///
/// Returns `None` when nothing meaningful is left.
pub fn finalize_group(instructions: Vec<Instruction>) -> Option<InstructionGroup> {
    let mut group = merge_instructions(remove_leading_empty(instructions));
    if group.len() == 1 {
        if let Instruction::Text { content, .. } = &mut group[0] {
            *content = content.trim_matches(EMPTY_CHARS).to_string();
        }
    }
    if is_empty_group(&group) {
        None
    } else {
        Some(group)
    }
}

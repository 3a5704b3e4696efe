//! Sparse table grid assembled cell by cell while walking `<table>` markup.

use std::collections::HashMap;

use crate::model::{Attributes, Instruction, InstructionGroup, TableCell, TableStatus};
use crate::structure::{clean_table, EMPTY_CHARS};

/// Upper bound for `rowspan` / `colspan` values.
const MAX_SPAN: usize = 1000;

#[derive(Debug)]
struct CellCapture {
    instructions: Vec<Instruction>,
    rowspan: usize,
    colspan: usize,
}

/// Collects cells into a `(row, col)` map, honoring row and column spans.
#[derive(Debug, Default)]
pub struct TableBuilder {
    cells: HashMap<(usize, usize), TableCell>,
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
    current: Option<CellCapture>,
}

/// Parse a span attribute; missing, invalid or zero values mean 1.
pub fn parse_span(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(1)
        .min(MAX_SPAN)
}

impl TableBuilder {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin capturing a `<td>` / `<th>`.
    pub fn start_cell(&mut self, rowspan: usize, colspan: usize) {
        self.current = Some(CellCapture {
            instructions: Vec::new(),
            rowspan: rowspan.max(1),
            colspan: colspan.max(1),
        });
    }

    /// True while a cell is open.
    pub fn in_cell(&self) -> bool {
        self.current.is_some()
    }

    /// Add an instruction to the open cell. Returns it back if no cell is open.
    pub fn push(&mut self, instruction: Instruction) -> Option<Instruction> {
        match &mut self.current {
            Some(cell) => {
                cell.instructions.push(instruction);
                None
            }
            None => Some(instruction),
        }
    }

    /// A block element closed inside the open cell.
    pub fn line_break(&mut self) {
        if let Some(cell) = &mut self.current {
            if let Some(Instruction::Text { content, .. }) = cell.instructions.last_mut() {
                content.push('\n');
            }
        }
    }

    /// `</tr>`: move the cursor to the start of the next row.
    pub fn end_row(&mut self) {
        self.row += 1;
        self.col = 0;
    }

    /// `</td>` / `</th>`: place the captured cell at every coordinate it spans.
    pub fn end_cell(&mut self) {
        let Some(capture) = self.current.take() else {
            return;
        };
        let cell = merge_cell_instructions(&capture.instructions);

        while self.cells.contains_key(&(self.row, self.col)) {
            self.col += 1;
        }
        for dy in 0..capture.rowspan {
            for dx in 0..capture.colspan {
                self.cells.insert((self.row + dy, self.col + dx), cell.clone());
            }
        }
        self.rows = self.rows.max(self.row + capture.rowspan);
        self.cols = self.cols.max(self.col + capture.colspan);
        self.col += capture.colspan;
    }

    /// Check if no cell was placed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Densify into a matrix; missing coordinates become empty text cells.
    pub fn finish(mut self) -> Vec<Vec<TableCell>> {
        if self.current.is_some() {
            self.end_cell();
        }
        let mut matrix = vec![vec![TableCell::empty(); self.cols]; self.rows];
        for ((r, c), cell) in self.cells {
            matrix[r][c] = match cell {
                TableCell::Text { text, attributes } => TableCell::Text {
                    text: text.trim_matches(EMPTY_CHARS).to_string(),
                    attributes,
                },
                image => image,
            };
        }
        matrix
    }
}

/// Collapse a cell's instructions into one cell.
///
/// Texts are concatenated, flags accumulate and valued attributes keep the
/// last value. A cell holding only images becomes an image cell.
pub fn merge_cell_instructions(instructions: &[Instruction]) -> TableCell {
    let mut text = String::new();
    let mut attributes = Attributes::default();
    let mut image: Option<(String, Option<String>)> = None;

    for inst in instructions {
        match inst {
            Instruction::Text {
                content,
                attributes: attrs,
            } => {
                text.push_str(content);
                attributes.absorb(attrs);
            }
            Instruction::Image { src, alt, .. } => {
                if image.is_none() {
                    image = Some((src.clone(), alt.clone()));
                }
            }
            Instruction::Table { .. } => {}
        }
    }

    match image {
        Some((src, alt)) if text.trim_matches(EMPTY_CHARS).is_empty() => TableCell::Image { src, alt },
        _ => TableCell::Text { text, attributes },
    }
}

/// Clean a finished matrix and turn it into instruction groups.
///
/// A single row is not a table: its non-empty cells become one line, and a
/// table that cleans down to one row becomes a single `fake_table` line.
pub fn table_to_groups(matrix: Vec<Vec<TableCell>>) -> Vec<InstructionGroup> {
    if matrix.is_empty() {
        return Vec::new();
    }
    let (matrix, status) = clean_table(matrix);
    match status {
        TableStatus::NotTable => {
            let mut cells: InstructionGroup = matrix
                .into_iter()
                .flatten()
                .filter_map(|cell| match cell {
                    TableCell::Text { text, attributes } if !text.trim_matches(EMPTY_CHARS).is_empty() => {
                        Some(Instruction::Text {
                            content: text,
                            attributes,
                        })
                    }
                    _ => None,
                })
                .collect();
            if cells.is_empty() {
                return Vec::new();
            }
            let last = cells.len() - 1;
            for cell in &mut cells[..last] {
                if let Instruction::Text { content, .. } = cell {
                    content.push(' ');
                }
            }
            vec![cells]
        }
        _ if matrix.is_empty() => Vec::new(),
        TableStatus::Cleaned if matrix.len() == 1 => {
            let line = matrix[0]
                .iter()
                .map(TableCell::display_text)
                .collect::<Vec<_>>()
                .join(" ");
            let attributes = Attributes {
                fake_table: true,
                ..Attributes::default()
            };
            vec![vec![Instruction::text(line, attributes)]]
        }
        status => vec![vec![Instruction::Table {
            matrix,
            cleaned: status == TableStatus::Cleaned,
        }]],
    }
}

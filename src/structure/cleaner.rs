//! Table cleanup.
//!
//! Filings split numbers across cells (`$` | `1,234` | `)`), pad tables
//! with spacer rows and columns, and repeat rows across page breaks. The
//! cleaner folds stray punctuation into the cell it belongs to and removes
//! empty and duplicate rows and columns.

use crate::model::{is_rectangular, TableCell, TableStatus};

/// Cell texts that count as empty.
const EMPTY_TABLE_TEXTS: &[&str] = &["", "\u{2013}", "-"];

/// Characters that open a value and belong to the cell on their right.
const LEFT_CHARS: &[char] = &['$', '(', '\u{2013}', '-'];

/// Characters that close a value and belong to the cell on their left.
const RIGHT_CHARS: &[char] = &[')', '%', '\u{2013}', '-'];

type Matrix = Vec<Vec<TableCell>>;

/// Clean a table matrix.
///
/// Ragged or empty matrices come back untouched as [`TableStatus::Dirty`];
/// a single row comes back untouched as [`TableStatus::NotTable`].
pub fn clean_table(matrix: Matrix) -> (Matrix, TableStatus) {
    if matrix.is_empty() || !is_rectangular(&matrix) {
        log::debug!("table is ragged or empty, leaving it dirty");
        return (matrix, TableStatus::Dirty);
    }
    if matrix.len() == 1 {
        return (matrix, TableStatus::NotTable);
    }

    let mut table = merge_table_formatting(matrix);
    images_to_text(&mut table);
    remove_empty_rows(&mut table);
    remove_empty_columns(&mut table);

    loop {
        let before = (table.len(), table.first().map_or(0, Vec::len));
        table = remove_subset_rows(table, RowDirection::BottomToTop);
        table = remove_subset_rows(table, RowDirection::TopToBottom);
        table = remove_subset_columns(table, ColumnDirection::LeftToRight);
        table = remove_subset_columns(table, ColumnDirection::RightToLeft);
        if (table.len(), table.first().map_or(0, Vec::len)) == before {
            break;
        }
    }

    (table, TableStatus::Cleaned)
}

fn cell_text(cell: &TableCell) -> &str {
    cell.as_text().unwrap_or_default()
}

fn is_empty_table_text(text: &str) -> bool {
    EMPTY_TABLE_TEXTS.contains(&text)
}

fn is_left_char_cell(cell: &TableCell) -> bool {
    matches!(cell, TableCell::Text { text, .. } if !text.is_empty() && text.chars().all(|c| LEFT_CHARS.contains(&c)))
}

fn is_right_char_cell(cell: &TableCell) -> bool {
    matches!(cell, TableCell::Text { text, .. } if !text.is_empty() && text.chars().all(|c| RIGHT_CHARS.contains(&c)))
}

fn is_content_cell(cell: &TableCell) -> bool {
    match cell {
        TableCell::Image { .. } => true,
        TableCell::Text { text, .. } => text
            .chars()
            .any(|c| !LEFT_CHARS.contains(&c) && !RIGHT_CHARS.contains(&c)),
    }
}

/// Fold punctuation-only cells into the neighbouring content cell.
fn merge_table_formatting(mut table: Matrix) -> Matrix {
    for row in &mut table {
        for col in 0..row.len() {
            if !is_left_char_cell(&row[col]) {
                continue;
            }
            let target = (col + 1..row.len()).find(|&c| is_content_cell(&row[c]));
            if let Some(target) = target.filter(|&c| row[c].as_text().is_some()) {
                let source = std::mem::take(&mut row[col]);
                if let TableCell::Text { text, .. } = &mut row[target] {
                    text.insert_str(0, cell_text(&source));
                }
            }
        }
    }

    for row in &mut table {
        for col in 0..row.len() {
            if !is_right_char_cell(&row[col]) {
                continue;
            }
            let target = (0..col).rev().find(|&c| is_content_cell(&row[c]));
            if let Some(target) = target.filter(|&c| row[c].as_text().is_some()) {
                let source = std::mem::take(&mut row[col]);
                if let TableCell::Text { text, .. } = &mut row[target] {
                    text.push_str(cell_text(&source));
                }
            }
        }
    }
    table
}

fn images_to_text(table: &mut Matrix) {
    for cell in table.iter_mut().flatten() {
        if let TableCell::Image { .. } = cell {
            *cell = TableCell::text(cell.display_text());
        }
    }
}

fn remove_empty_rows(table: &mut Matrix) {
    table.retain(|row| row.iter().any(|cell| !is_empty_table_text(cell_text(cell))));
}

fn remove_empty_columns(table: &mut Matrix) {
    let Some(width) = table.first().map(Vec::len) else {
        return;
    };
    let keep: Vec<bool> = (0..width)
        .map(|j| table.iter().any(|row| !is_empty_table_text(cell_text(&row[j]))))
        .collect();
    retain_columns(table, &keep);
}

fn retain_columns(table: &mut Matrix, keep: &[bool]) {
    for row in table.iter_mut() {
        let mut j = 0;
        row.retain(|_| {
            let kept = keep[j];
            j += 1;
            kept
        });
    }
}

/// True if every non-empty cell of `a` equals the matching cell of `b`.
fn is_subset<'a>(
    a: impl Iterator<Item = &'a TableCell>,
    b: impl Iterator<Item = &'a TableCell>,
) -> bool {
    a.zip(b).all(|(x, y)| {
        let x = cell_text(x);
        is_empty_table_text(x) || x == cell_text(y)
    })
}

#[derive(Debug, Clone, Copy)]
enum RowDirection {
    BottomToTop,
    TopToBottom,
}

#[derive(Debug, Clone, Copy)]
enum ColumnDirection {
    LeftToRight,
    RightToLeft,
}

fn remove_subset_rows(table: Matrix, direction: RowDirection) -> Matrix {
    let n = table.len();
    let mut keep = vec![true; n];
    match direction {
        RowDirection::BottomToTop => {
            for i in (1..n).rev() {
                if is_subset(table[i].iter(), table[i - 1].iter()) {
                    keep[i] = false;
                }
            }
        }
        RowDirection::TopToBottom => {
            for i in 0..n.saturating_sub(1) {
                if is_subset(table[i].iter(), table[i + 1].iter()) {
                    keep[i] = false;
                }
            }
        }
    }
    table
        .into_iter()
        .zip(keep)
        .filter_map(|(row, k)| k.then_some(row))
        .collect()
}

fn column(table: &Matrix, j: usize) -> Vec<&TableCell> {
    table.iter().map(|row| &row[j]).collect()
}

fn remove_subset_columns(mut table: Matrix, direction: ColumnDirection) -> Matrix {
    let width = table.first().map_or(0, Vec::len);
    let mut keep = vec![true; width];
    match direction {
        ColumnDirection::LeftToRight => {
            for j in 0..width.saturating_sub(1) {
                if is_subset(
                    column(&table, j).into_iter(),
                    column(&table, j + 1).into_iter(),
                ) {
                    keep[j] = false;
                }
            }
        }
        ColumnDirection::RightToLeft => {
            for j in (1..width).rev() {
                if is_subset(
                    column(&table, j).into_iter(),
                    column(&table, j - 1).into_iter(),
                ) {
                    keep[j] = false;
                }
            }
        }
    }
    retain_columns(&mut table, &keep);
    table
}

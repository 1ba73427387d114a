//! CSV import/export functionality

use crate::document::Document;
use crate::error::Result;
use gridseek_engine::engine::{Cell, CellRef, SelectionRange, parse_number};
use std::io::Write;
use std::path::Path;

/// Parse a CSV file into cells, starting at the given offset
pub fn parse_csv(path: &Path, start_col: usize, start_row: usize) -> Result<Vec<(CellRef, Cell)>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_csv_content(&content, start_col, start_row))
}

/// Parse CSV text into cells, skipping empty fields
pub fn parse_csv_content(content: &str, start_col: usize, start_row: usize) -> Vec<(CellRef, Cell)> {
    let mut cells = Vec::new();
    for (row_idx, line) in content.lines().enumerate() {
        for (col_idx, field) in parse_csv_line(line).into_iter().enumerate() {
            if field.is_empty() {
                continue;
            }
            let cell_ref = CellRef::new(start_col + col_idx, start_row + row_idx);
            cells.push((cell_ref, parse_csv_field(&field)));
        }
    }
    cells
}

/// Parse a single CSV line, handling quoted fields
pub(crate) fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '"' => {
                    in_quotes = true;
                    field_was_quoted = true;
                }
                ',' => {
                    if field_was_quoted {
                        fields.push(std::mem::take(&mut current));
                    } else {
                        fields.push(current.trim().to_string());
                        current.clear();
                    }
                    field_was_quoted = false;
                }
                _ => current.push(c),
            }
        }
    }
    if field_was_quoted {
        fields.push(current);
    } else {
        fields.push(current.trim().to_string());
    }
    fields
}

/// Parse a CSV field into an appropriate Cell type
/// - Valid number -> Number (unless it has leading zeros like "007")
/// - Otherwise -> Text
pub(crate) fn parse_csv_field(field: &str) -> Cell {
    if field.is_empty() {
        return Cell::new_empty();
    }

    // Keep explicit surrounding whitespace (typically from quoted CSV fields).
    let trimmed = field.trim();
    if field != trimmed {
        return Cell::new_text(field);
    }

    // Preserve strings that look like numbers but have leading zeros (e.g., "007", "00123")
    // unless they're just "0" or start with "0."
    if trimmed.starts_with('0')
        && trimmed.len() > 1
        && !trimmed.starts_with("0.")
        && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
    {
        return Cell::new_text(trimmed);
    }

    if let Some(n) = parse_number(trimmed) {
        return Cell::new_number(n);
    }

    Cell::new_text(trimmed)
}

/// Export the grid to CSV using display values. Without a range the bounds
/// are detected from the populated cells.
pub fn write_csv(path: &Path, doc: &Document, range: Option<SelectionRange>) -> Result<()> {
    let range = match range {
        Some(range) => range,
        None => {
            let mut min = (usize::MAX, usize::MAX);
            let mut max = (0usize, 0usize);
            for entry in doc.grid.iter() {
                let cell_ref = entry.key();
                min = (min.0.min(cell_ref.col), min.1.min(cell_ref.row));
                max = (max.0.max(cell_ref.col), max.1.max(cell_ref.row));
            }
            if min.0 == usize::MAX {
                // Empty grid
                std::fs::File::create(path)?;
                return Ok(());
            }
            SelectionRange::from_corners(&CellRef::new(min.0, min.1), &CellRef::new(max.0, max.1))
        }
    };

    let mut file = std::fs::File::create(path)?;
    let start = range.start();
    for row in start.row..start.row + range.height() {
        let row_fields: Vec<String> = (start.col..start.col + range.width())
            .map(|col| escape_csv_field(&doc.get_cell_display(&CellRef::new(col, row))))
            .collect();
        writeln!(file, "{}", row_fields.join(","))?;
    }

    Ok(())
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}

//! Parser for .grd file format

use crate::error::{GridseekError, Result};
use gridseek_engine::engine::{Cell, CellRef, parse_number};
use std::fs;
use std::path::Path;

/// Parse a .grd file into cells, in file order
pub fn parse_grd(path: &Path) -> Result<Vec<(CellRef, Cell)>> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Vec<(CellRef, Cell)>> {
    let mut cells = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "CELLREF: VALUE" format
        let Some((cell_ref_str, value_str)) = line.split_once(':') else {
            return Err(GridseekError::Parse {
                line: line_num + 1,
                message: "Expected 'CELLREF: VALUE' format".to_string(),
            });
        };

        let cell_ref_str = cell_ref_str.trim();
        let cell_ref = CellRef::from_str(cell_ref_str).ok_or_else(|| GridseekError::Parse {
            line: line_num + 1,
            message: format!("Invalid cell reference: {}", cell_ref_str),
        })?;

        let cell = parse_cell_value(value_str, line_num + 1)?;
        if !cell.is_empty() {
            cells.push((cell_ref, cell));
        }
    }

    Ok(cells)
}

/// Parse a cell value string into a Cell
fn parse_cell_value(value: &str, line_num: usize) -> Result<Cell> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(Cell::new_empty());
    }

    // Formula: starts with '='
    if let Some(formula) = value.strip_prefix('=') {
        return Ok(Cell::new_script(formula));
    }

    // Quoted string: starts and ends with '"'
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let text = unescape_grd_text(&value[1..value.len() - 1]);
        return Ok(Cell::new_text(&text));
    }

    if let Some(n) = parse_number(value) {
        return Ok(Cell::new_number(n));
    }

    Err(GridseekError::Parse {
        line: line_num,
        message: format!("Invalid value: {}. Use quotes for text.", value),
    })
}

fn unescape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                match next {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    _ => {
                        out.push('\\');
                        out.push(next);
                    }
                }
            } else {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridseek_engine::engine::CellType;

    fn only_cell(content: &str) -> Cell {
        let mut cells = parse_grd_content(content).unwrap();
        assert_eq!(cells.len(), 1);
        cells.remove(0).1
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(only_cell("A1: 42").contents, CellType::Number(42.0));
    }

    #[test]
    fn test_parse_text_escaped_quotes() {
        assert_eq!(
            only_cell(r#"A1: "He said \"hi\"""#).contents,
            CellType::Text("He said \"hi\"".to_string())
        );
    }

    #[test]
    fn test_parse_formula() {
        assert_eq!(
            only_cell("A1: =B1 + C1").contents,
            CellType::Script("B1 + C1".to_string())
        );
    }

    #[test]
    fn test_parse_multiple_cells_skips_comments() {
        let content = r#"
# Test spreadsheet
A1: 100

A2: 200
A3: "Total"
B3: =A1 + A2
"#;
        let cells = parse_grd_content(content).unwrap();
        let refs: Vec<String> = cells.iter().map(|(r, _)| r.to_string()).collect();
        assert_eq!(refs, vec!["A1", "A2", "A3", "B3"]);
    }

    #[test]
    fn test_unquoted_text_is_an_error() {
        let err = parse_grd_content("A1: 1\nB1: hello").unwrap_err();
        assert!(matches!(err, GridseekError::Parse { line: 2, .. }));
    }
}

//! Writer for .grd file format

use crate::error::Result;
use gridseek_engine::engine::{CellType, GridRead};
use std::fs;
use std::path::Path;

/// Write a grid to a .grd file
pub fn write_grd<G: GridRead + ?Sized>(path: &Path, grid: &G) -> Result<()> {
    fs::write(path, write_grd_content(grid))?;
    Ok(())
}

/// Write a grid to a .grd format string, row-major
pub fn write_grd_content<G: GridRead + ?Sized>(grid: &G) -> String {
    let mut lines = vec!["# Gridseek Spreadsheet".to_string()];

    for (cell_ref, cell) in grid.populated() {
        let value_str = match &cell.contents {
            CellType::Empty => continue,
            CellType::Number(n) => n.to_string(),
            CellType::Text(s) => format!("\"{}\"", escape_grd_text(s)),
            CellType::Script(s) => format!("={}", s),
        };
        lines.push(format!("{}: {}", cell_ref, value_str));
    }

    lines.join("\n") + "\n"
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_grd_content;
    use gridseek_engine::engine::{Cell, CellRef, GridSnapshot};

    #[test]
    fn test_write_values() {
        let mut grid = GridSnapshot::new();
        grid.insert(CellRef::new(0, 0), Cell::new_number(42.0));
        grid.insert(CellRef::new(1, 0), Cell::new_text("say \"hi\""));
        grid.insert(CellRef::new(2, 0), Cell::new_script("A1 * 2"));
        let content = write_grd_content(&grid);
        assert!(content.contains("A1: 42"));
        assert!(content.contains(r#"B1: "say \"hi\"""#));
        assert!(content.contains("C1: =A1 * 2"));
    }

    #[test]
    fn test_sorted_output() {
        let mut grid = GridSnapshot::new();
        grid.insert(CellRef::new(1, 1), Cell::new_number(3.0)); // B2
        grid.insert(CellRef::new(0, 0), Cell::new_number(1.0)); // A1
        grid.insert(CellRef::new(1, 0), Cell::new_number(2.0)); // B1
        let content = write_grd_content(&grid);
        let lines: Vec<_> = content.lines().collect();
        assert!(lines[1].starts_with("A1"));
        assert!(lines[2].starts_with("B1"));
        assert!(lines[3].starts_with("B2"));
    }

    #[test]
    fn test_text_survives_reload() {
        let mut grid = GridSnapshot::new();
        grid.insert(CellRef::new(0, 0), Cell::new_text(r"back\slash and 12"));
        let reloaded = parse_grd_content(&write_grd_content(&grid)).unwrap();
        assert_eq!(reloaded[0].1, Cell::new_text(r"back\slash and 12"));
    }
}

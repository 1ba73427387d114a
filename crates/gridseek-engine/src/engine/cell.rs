//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`CellType`] - The type of content in a cell (empty, text, number, or formula)
//! - [`Cell`] - A cell with content and the resolved value of a formula
//! - [`Grid`] - Thread-safe sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

use super::aggregate::parse_number;
use super::cell_ref::CellRef;

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    Script(String),
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
    /// Resolved display value of a script cell, supplied by whoever
    /// evaluates formulas (not serialized).
    #[serde(skip)]
    pub cached_value: Option<String>,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            contents: CellType::Empty,
            cached_value: None,
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellType::Text(text.to_string()),
            cached_value: None,
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellType::Number(n),
            cached_value: None,
        }
    }

    /// Create a new cell containing a script/formula with no resolved value yet.
    pub fn new_script(script: &str) -> Cell {
        Cell {
            contents: CellType::Script(script.to_string()),
            cached_value: None,
        }
    }

    /// Attach the resolved value of a formula.
    pub fn with_cached_value(mut self, value: &str) -> Cell {
        self.cached_value = Some(value.to_string());
        self
    }

    /// Parse user input and create appropriate cell type.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Script (without the '=')
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }

        if let Some(formula) = trimmed.strip_prefix('=') {
            return Cell::new_script(formula);
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            let text = &trimmed[1..trimmed.len() - 1];
            return Cell::new_text(text);
        }

        if let Some(n) = parse_number(trimmed) {
            return Cell::new_number(n);
        }

        Cell::new_text(trimmed)
    }

    /// Build the cell that results from rewriting this cell's resolved text.
    ///
    /// Numbers stay numbers when the rewritten text still parses as one;
    /// everything else becomes text. Formula cells are never rewritten in
    /// place: the store is expected to refuse the write.
    pub fn with_replaced_text(&self, text: String) -> Cell {
        match &self.contents {
            CellType::Number(_) => match parse_number(&text) {
                Some(n) => Cell::new_number(n),
                None => Cell::new_text(&text),
            },
            CellType::Empty | CellType::Text(_) | CellType::Script(_) => Cell {
                contents: CellType::Text(text),
                cached_value: None,
            },
        }
    }

    /// Whether the cell has any content worth counting.
    pub fn is_empty(&self) -> bool {
        match &self.contents {
            CellType::Empty => true,
            CellType::Text(s) => s.is_empty(),
            CellType::Number(_) | CellType::Script(_) => false,
        }
    }

    /// The cell's textual representation, as seen by search.
    ///
    /// Script cells without a resolved value have none.
    pub fn resolved_text(&self) -> Option<Cow<'_, str>> {
        match &self.contents {
            CellType::Empty => None,
            CellType::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellType::Number(n) => Some(Cow::Owned(n.to_string())),
            CellType::Script(_) => self.cached_value.as_deref().map(Cow::Borrowed),
        }
    }

    /// The cell's numeric value, if it has one.
    /// Text (and resolved formula text) counts when it parses as a decimal number.
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.contents {
            CellType::Empty => None,
            CellType::Number(n) => Some(*n).filter(|n| n.is_finite()),
            CellType::Text(s) => parse_number(s),
            CellType::Script(_) => self.cached_value.as_deref().and_then(parse_number),
        }
    }

    /// Get a display string for the cell content (for editing).
    pub fn to_input_string(&self) -> String {
        match &self.contents {
            CellType::Empty => String::new(),
            CellType::Text(s) => s.clone(),
            CellType::Number(n) => n.to_string(),
            CellType::Script(s) => format!("={}", s),
        }
    }
}

/// Thread-safe sparse grid storage (DashMap is internally sharded, the Arc
/// lets observers share it).
pub type Grid = Arc<DashMap<CellRef, Cell>>;

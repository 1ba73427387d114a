//! Live summary statistics for a multi-cell selection.
//!
//! The status bar shows count, sum and average for whatever rectangle is
//! selected. Everything here is a pure function of the range and the grid,
//! cheap enough to recompute after every selection or content change.

use super::cell::Cell;
use super::cell_ref::CellRef;
use super::format::{format_number, round_display};
use super::range::SelectionRange;
use super::store::GridRead;

/// Count/sum/average over a selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregateSummary {
    /// Cells in the range with non-empty content.
    pub count: usize,
    /// Cells that contributed a number to `sum`.
    pub numeric_count: usize,
    /// Rounded to 3 decimal places.
    pub sum: f64,
    /// Rounded to 3 decimal places; 0 when nothing was numeric.
    pub average: f64,
}

impl AggregateSummary {
    /// Whether sum and average are meaningful enough to show.
    pub fn has_numeric(&self) -> bool {
        self.numeric_count > 0
    }

    /// Status bar text. Sum and average are suppressed when nothing in the
    /// selection is numeric.
    pub fn status_text(&self) -> String {
        if self.has_numeric() {
            format!(
                "Count: {}  Sum: {}  Average: {}",
                self.count,
                format_number(self.sum),
                format_number(self.average)
            )
        } else {
            format!("Count: {}", self.count)
        }
    }
}

/// Parse text as a plain base-10 number.
///
/// Leading/trailing whitespace is ignored. Spellings `f64::from_str` accepts
/// but a spreadsheet user would not call numbers (`inf`, `NaN`, `infinity`)
/// are rejected, as is anything non-finite.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || !trimmed
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compute the aggregate for a selection.
///
/// Returns `None` for a single-cell range: aggregates only summarize
/// multi-cell selections.
pub fn compute_aggregate<G>(range: &SelectionRange, grid: &G) -> Option<AggregateSummary>
where
    G: GridRead + ?Sized,
{
    if range.cell_count() <= 1 {
        return None;
    }

    let mut count = 0usize;
    let mut numeric_count = 0usize;
    let mut sum = 0.0f64;

    let mut visit = |cell: &Cell| {
        if cell.is_empty() {
            return;
        }
        count += 1;
        if let Some(n) = cell.numeric_value() {
            sum += n;
            numeric_count += 1;
        }
    };

    // Both walks are row-major, so the summation order is the same either way.
    if range.cell_count() > grid.populated_len() {
        for (cell_ref, cell) in grid.populated() {
            if range.contains(&cell_ref) {
                visit(&cell);
            }
        }
    } else {
        for cell_ref in range.cells() {
            if let Some(cell) = grid.cell(&cell_ref) {
                visit(&cell);
            }
        }
    }

    let average = if numeric_count > 0 {
        sum / numeric_count as f64
    } else {
        0.0
    };

    Some(AggregateSummary {
        count,
        numeric_count,
        sum: round_display(sum),
        average: round_display(average),
    })
}

/// Aggregate for the rectangle spanned by two corners.
pub fn aggregate_between<G>(anchor: &CellRef, focus: &CellRef, grid: &G) -> Option<AggregateSummary>
where
    G: GridRead + ?Sized,
{
    compute_aggregate(&SelectionRange::from_corners(anchor, focus), grid)
}

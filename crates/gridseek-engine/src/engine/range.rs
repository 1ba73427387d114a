//! Rectangular selections.

use std::fmt;

use super::cell_ref::CellRef;

/// A rectangular range of cells, inclusive on both ends.
///
/// Always normalized: `start_col <= end_col` and `start_row <= end_row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    start_col: usize,
    start_row: usize,
    end_col: usize,
    end_row: usize,
}

impl SelectionRange {
    /// Build a range from an anchor and a focus cell in any order.
    pub fn from_corners(anchor: &CellRef, focus: &CellRef) -> Self {
        SelectionRange {
            start_col: anchor.col.min(focus.col),
            start_row: anchor.row.min(focus.row),
            end_col: anchor.col.max(focus.col),
            end_row: anchor.row.max(focus.row),
        }
    }

    /// A 1x1 range.
    pub fn single(cell: &CellRef) -> Self {
        Self::from_corners(cell, cell)
    }

    /// Parse "A1:B5" (either corner order) or a single "A1".
    pub fn parse(range: &str) -> Option<Self> {
        match range.split_once(':') {
            Some((start, end)) => Some(Self::from_corners(
                &CellRef::from_str(start)?,
                &CellRef::from_str(end)?,
            )),
            None => CellRef::from_str(range).map(|cell| Self::single(&cell)),
        }
    }

    pub fn start(&self) -> CellRef {
        CellRef::new(self.start_col, self.start_row)
    }

    pub fn end(&self) -> CellRef {
        CellRef::new(self.end_col, self.end_row)
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of cells covered, saturating for absurdly large selections.
    pub fn cell_count(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    pub fn is_single(&self) -> bool {
        self.start_col == self.end_col && self.start_row == self.end_row
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start_col..=self.end_col).contains(&cell.col)
            && (self.start_row..=self.end_row).contains(&cell.row)
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + use<> {
        let (start_col, end_col) = (self.start_col, self.end_col);
        (self.start_row..=self.end_row)
            .flat_map(move |row| (start_col..=end_col).map(move |col| CellRef::new(col, row)))
    }
}

impl fmt::Display for SelectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start())
        } else {
            write!(f, "{}:{}", self.start(), self.end())
        }
    }
}

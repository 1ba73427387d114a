//! The document as a grid store for the find/replace engine.

use super::Document;
use crate::error::WriteRejection;
use crate::store::{BatchWrite, GridWrite};
use gridseek_engine::engine::{Cell, CellRef, GridRead};

impl GridRead for Document {
    fn cell(&self, at: &CellRef) -> Option<Cell> {
        self.grid.cell(at)
    }

    fn populated(&self) -> Vec<(CellRef, Cell)> {
        self.grid.populated()
    }

    fn populated_len(&self) -> usize {
        self.grid.len()
    }
}

impl GridWrite for Document {
    fn set(&mut self, at: CellRef, cell: Cell) -> Result<(), WriteRejection> {
        self.write_cell(at, cell)
    }

    fn set_many(&mut self, writes: Vec<(CellRef, Cell)>) -> BatchWrite {
        self.write_cells(writes)
    }
}

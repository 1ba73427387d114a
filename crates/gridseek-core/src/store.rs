//! Write side of a grid store.
//!
//! The find/replace engine only ever mutates the grid through [`GridWrite`],
//! so the store decides what is writable and what history is recorded.

use crate::error::WriteRejection;
use gridseek_engine::engine::{Cell, CellRef, GridRead};

/// Outcome of a bulk write: what landed and what the store refused.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchWrite {
    pub applied: Vec<CellRef>,
    pub rejected: Vec<WriteRejection>,
}

impl BatchWrite {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

pub trait GridWrite {
    /// Write one cell, subject to the store's validation.
    fn set(&mut self, at: CellRef, cell: Cell) -> Result<(), WriteRejection>;

    /// Write many cells as one atomic step. Refused cells are skipped and
    /// reported; the rest are applied together.
    fn set_many(&mut self, writes: Vec<(CellRef, Cell)>) -> BatchWrite;
}

/// Anything the find/replace engine can both scan and mutate.
pub trait GridStore: GridRead + GridWrite {}

impl<T: GridRead + GridWrite + ?Sized> GridStore for T {}

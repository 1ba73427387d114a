//! Read access to a grid.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::cell::Cell;
use super::cell_ref::CellRef;

/// Point-in-time copy of a grid. `BTreeMap` keeps it in row-major order.
pub type GridSnapshot = BTreeMap<CellRef, Cell>;

/// Read side of a grid store.
pub trait GridRead {
    /// The cell at a coordinate, if populated.
    fn cell(&self, at: &CellRef) -> Option<Cell>;

    /// Every populated cell, sorted row-major.
    fn populated(&self) -> Vec<(CellRef, Cell)>;

    /// Number of populated cells.
    fn populated_len(&self) -> usize;
}

impl GridRead for DashMap<CellRef, Cell> {
    fn cell(&self, at: &CellRef) -> Option<Cell> {
        self.get(at).map(|r| r.clone())
    }

    fn populated(&self) -> Vec<(CellRef, Cell)> {
        let mut cells: Vec<(CellRef, Cell)> = self
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }

    fn populated_len(&self) -> usize {
        self.len()
    }
}

impl GridRead for GridSnapshot {
    fn cell(&self, at: &CellRef) -> Option<Cell> {
        self.get(at).cloned()
    }

    fn populated(&self) -> Vec<(CellRef, Cell)> {
        self.iter()
            .map(|(cell_ref, cell)| (cell_ref.clone(), cell.clone()))
            .collect()
    }

    fn populated_len(&self) -> usize {
        self.len()
    }
}

impl<T: GridRead + ?Sized> GridRead for Arc<T> {
    fn cell(&self, at: &CellRef) -> Option<Cell> {
        (**self).cell(at)
    }

    fn populated(&self) -> Vec<(CellRef, Cell)> {
        (**self).populated()
    }

    fn populated_len(&self) -> usize {
        (**self).populated_len()
    }
}

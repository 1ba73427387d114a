use crate::error::Result;
use gridseek_engine::engine::{Cell, CellRef, Grid, GridRead, GridSnapshot};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of undo entries to keep
pub(crate) const MAX_UNDO_STACK: usize = 100;

/// Represents an undoable action for a single cell
#[derive(Clone, Debug)]
pub struct UndoAction {
    pub cell_ref: CellRef,
    pub old_cell: Option<Cell>,
    pub new_cell: Option<Cell>,
}

/// Represents an undo entry (single action or batch from a bulk write)
#[derive(Clone, Debug)]
pub enum UndoEntry {
    /// A single cell modification
    Single(UndoAction),
    /// A batch of modifications applied together (e.g. replace all)
    Batch(Vec<UndoAction>),
}

/// UI-agnostic document state for the spreadsheet.
///
/// The document is the grid store: every write goes through its validation
/// and lands in its undo history.
pub struct Document {
    /// The spreadsheet grid. Writes must hold `commit_gate`; outside the
    /// crate it is read through `get_cell`, `GridRead` or an observer.
    pub(crate) grid: Grid,
    /// Held exclusively while the grid is mutated, shared while observers
    /// snapshot it, so a batch is never seen half-applied.
    pub(crate) commit_gate: Arc<RwLock<()>>,
    /// Cells that refuse every write
    pub locked: HashSet<CellRef>,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the grid has been modified
    pub modified: bool,
    /// Undo stack
    pub undo_stack: Vec<UndoEntry>,
    /// Redo stack
    pub redo_stack: Vec<UndoEntry>,
}

impl Document {
    /// Create a new document state.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Document {
            grid: Arc::new(dashmap::DashMap::new()),
            commit_gate: Arc::new(RwLock::new(())),
            locked: HashSet::new(),
            file_path: None,
            modified: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Create a new document and load a file if provided.
    pub fn with_file(path: Option<PathBuf>) -> Result<Self> {
        let mut doc = Self::new();
        if let Some(ref p) = path {
            if p.exists() {
                doc.load_file(p)?;
            } else {
                doc.file_path = Some(p.clone());
                doc.modified = false;
            }
        }
        Ok(doc)
    }

    /// A read handle that can outlive borrows of the document.
    pub fn observer(&self) -> GridObserver {
        GridObserver {
            grid: self.grid.clone(),
            commit_gate: self.commit_gate.clone(),
        }
    }

    pub(crate) fn write_guard(&self) -> RwLockWriteGuard<'_, ()> {
        self.commit_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared read access to a document's grid.
///
/// Snapshots are taken under the document's commit gate, so they always show
/// the grid either before or after a bulk write, never partway through.
#[derive(Clone)]
pub struct GridObserver {
    grid: Grid,
    commit_gate: Arc<RwLock<()>>,
}

impl GridObserver {
    fn read_guard(&self) -> RwLockReadGuard<'_, ()> {
        self.commit_gate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of the grid, row-major.
    pub fn snapshot(&self) -> GridSnapshot {
        let _guard = self.read_guard();
        self.grid.populated().into_iter().collect()
    }

    pub fn cell(&self, at: &CellRef) -> Option<Cell> {
        let _guard = self.read_guard();
        self.grid.cell(at)
    }
}

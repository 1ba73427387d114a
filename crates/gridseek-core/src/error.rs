//! Error types for Gridseek core.

use gridseek_engine::engine::CellRef;
use thiserror::Error;

/// Errors that can occur in the Gridseek document layer
#[derive(Error, Debug)]
pub enum GridseekError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("No file path set")]
    NoFilePath,

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Write rejected: {0}")]
    Write(#[from] WriteRejection),
}

/// Why the grid store refused a write. Always local to one cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteRejection {
    #[error("{0} holds a formula")]
    FormulaCell(CellRef),

    #[error("{0} is locked")]
    LockedCell(CellRef),
}

impl WriteRejection {
    pub fn cell_ref(&self) -> &CellRef {
        match self {
            WriteRejection::FormulaCell(cell_ref) | WriteRejection::LockedCell(cell_ref) => {
                cell_ref
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, GridseekError>;

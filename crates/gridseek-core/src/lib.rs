//! gridseek-core - UI-agnostic document model, find/replace and storage.

pub mod document;
pub mod error;
pub mod find;
pub mod input;
pub mod session;
pub mod storage;
pub mod store;

pub use document::{Document, GridObserver, UndoAction};
pub use error::{GridseekError, Result, WriteRejection};
pub use find::{FindCommand, FindOutcome, FindPhase, FindReplace, FindSnapshot};
pub use input::{FindAction, Key, KeyChord, Keybindings};
pub use session::EditorSession;
pub use store::{BatchWrite, GridStore, GridWrite};

pub use gridseek_engine::engine::{AggregateSummary, Cell, CellRef, CellType, SelectionRange};

//! Document state and logic (UI-agnostic).

mod io;
mod ops;
mod state;
mod store;

pub use state::{Document, GridObserver, UndoAction, UndoEntry};

//! Spreadsheet engine API.
//!
//! This module provides the pure, UI-agnostic pieces of the editor:
//!
//! - [`Cell`], [`CellType`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ column/row indices)
//! - [`SelectionRange`] - Normalized rectangular selections
//! - [`GridRead`] - Read access to a grid in row-major order
//! - [`TextMatcher`] - Case-insensitive literal matching and replacement
//! - [`compute_aggregate`] - Count/sum/average over a selection
//! - [`format_number`] - Format values for display

mod aggregate;
mod cell;
mod cell_ref;
mod format;
mod matcher;
mod range;
mod store;

pub use aggregate::{AggregateSummary, aggregate_between, compute_aggregate, parse_number};
pub use cell::{Cell, CellType, Grid};
pub use cell_ref::CellRef;
pub use format::{format_number, round_display};
pub use matcher::TextMatcher;
pub use range::SelectionRange;
pub use store::{GridRead, GridSnapshot};

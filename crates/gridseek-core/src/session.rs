//! An editing session: one document, its find panel and the current
//! selection.
//!
//! The session is what a front end holds. It routes find commands to the
//! find engine, keeps the match list in step with direct edits and history,
//! and answers selection aggregate queries.

use crate::document::Document;
use crate::error::Result;
use crate::find::{FindCommand, FindOutcome, FindReplace, FindSnapshot};
use crate::input::{KeyChord, Keybindings};
use gridseek_engine::engine::{AggregateSummary, CellRef, SelectionRange, compute_aggregate};

pub struct EditorSession {
    pub document: Document,
    find: FindReplace,
    selection: Option<SelectionRange>,
}

impl EditorSession {
    pub fn new(document: Document) -> Self {
        EditorSession {
            document,
            find: FindReplace::new(),
            selection: None,
        }
    }

    pub fn find(&self) -> &FindReplace {
        &self.find
    }

    pub fn find_snapshot(&self) -> FindSnapshot {
        self.find.snapshot()
    }

    pub fn dispatch(&mut self, command: FindCommand) -> FindOutcome {
        self.find.apply(command, &mut self.document)
    }

    /// Translate a chord and dispatch it. `None` when the chord is unbound.
    pub fn handle_key(&mut self, chord: &KeyChord, keys: &Keybindings) -> Option<FindOutcome> {
        let command = keys.translate(chord)?;
        Some(self.dispatch(command))
    }

    pub fn selection(&self) -> Option<&SelectionRange> {
        self.selection.as_ref()
    }

    /// Select the rectangle spanned by anchor and focus, in any orientation.
    pub fn select(&mut self, anchor: &CellRef, focus: &CellRef) {
        self.selection = Some(SelectionRange::from_corners(anchor, focus));
    }

    pub fn select_range(&mut self, range: SelectionRange) {
        self.selection = Some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Aggregate of the current selection; `None` with no selection or a
    /// single selected cell.
    pub fn aggregate(&self) -> Option<AggregateSummary> {
        let range = self.selection.as_ref()?;
        compute_aggregate(range, &self.document)
    }

    /// Direct user edit of one cell. Find matches are refreshed afterwards.
    pub fn edit_cell(&mut self, cell_ref: CellRef, input: &str) -> Result<()> {
        self.document.set_cell_from_input(cell_ref, input)?;
        self.find.refresh(&self.document);
        Ok(())
    }

    pub fn undo(&mut self) -> Result<()> {
        self.document.undo()?;
        self.find.refresh(&self.document);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        self.document.redo()?;
        self.find.refresh(&self.document);
        Ok(())
    }

    /// Re-scan after the grid changed outside the session (formula values,
    /// reloads).
    pub fn refresh(&mut self) {
        self.find.refresh(&self.document);
    }
}

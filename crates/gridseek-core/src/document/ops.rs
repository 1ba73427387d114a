use super::{Document, UndoAction, UndoEntry};
use crate::error::{GridseekError, Result, WriteRejection};
use crate::store::BatchWrite;
use gridseek_engine::engine::{Cell, CellRef, CellType};

impl Document {
    /// Validate a write that rewrites existing content (find/replace).
    /// Locked cells and formula cells refuse it.
    pub(crate) fn check_writable(&self, cell_ref: &CellRef) -> std::result::Result<(), WriteRejection> {
        if self.locked.contains(cell_ref) {
            return Err(WriteRejection::LockedCell(cell_ref.clone()));
        }
        if let Some(cell) = self.grid.get(cell_ref)
            && matches!(cell.contents, CellType::Script(_))
        {
            return Err(WriteRejection::FormulaCell(cell_ref.clone()));
        }
        Ok(())
    }

    /// Validate a direct user edit. Only locks apply: typing over a formula
    /// is allowed.
    fn check_editable(&self, cell_ref: &CellRef) -> std::result::Result<(), WriteRejection> {
        if self.locked.contains(cell_ref) {
            return Err(WriteRejection::LockedCell(cell_ref.clone()));
        }
        Ok(())
    }

    fn trim_undo_stack(&mut self) {
        if self.undo_stack.len() > super::state::MAX_UNDO_STACK {
            self.undo_stack.remove(0);
        }
    }

    /// Push an undo action before modifying a cell
    fn push_undo(&mut self, cell_ref: CellRef, new_cell: Option<Cell>) {
        let old_cell = self.grid.get(&cell_ref).map(|r| r.clone());
        self.undo_stack.push(UndoEntry::Single(UndoAction {
            cell_ref,
            old_cell,
            new_cell,
        }));
        self.redo_stack.clear();
        self.trim_undo_stack();
    }

    /// Push a batch of undo actions (e.g., from replace all)
    pub fn push_undo_batch(&mut self, actions: Vec<UndoAction>) {
        if actions.is_empty() {
            return;
        }
        self.undo_stack.push(UndoEntry::Batch(actions));
        self.redo_stack.clear();
        self.trim_undo_stack();
    }

    /// Insert or remove a cell under the commit gate.
    fn put_cell(&self, cell_ref: &CellRef, state: Option<Cell>) {
        let _guard = self.write_guard();
        match state {
            Some(cell) if !cell.is_empty() => {
                self.grid.insert(cell_ref.clone(), cell);
            }
            _ => {
                self.grid.remove(cell_ref);
            }
        }
    }

    /// Write a validated cell and record it in history.
    pub(crate) fn write_cell(
        &mut self,
        cell_ref: CellRef,
        cell: Cell,
    ) -> std::result::Result<(), WriteRejection> {
        self.check_writable(&cell_ref)?;
        tracing::debug!(cell = %cell_ref, "write cell");
        let state = (!cell.is_empty()).then_some(cell);
        self.push_undo(cell_ref.clone(), state.clone());
        self.put_cell(&cell_ref, state);
        self.modified = true;
        Ok(())
    }

    /// Write many validated cells as one step and one undo entry.
    pub(crate) fn write_cells(&mut self, writes: Vec<(CellRef, Cell)>) -> BatchWrite {
        let mut outcome = BatchWrite::default();
        let mut accepted = Vec::with_capacity(writes.len());
        for (cell_ref, cell) in writes {
            match self.check_writable(&cell_ref) {
                Ok(()) => accepted.push((cell_ref, cell)),
                Err(rejection) => {
                    tracing::warn!(%rejection, "bulk write skipped cell");
                    outcome.rejected.push(rejection);
                }
            }
        }
        if accepted.is_empty() {
            return outcome;
        }

        let mut actions = Vec::with_capacity(accepted.len());
        {
            let _guard = self.write_guard();
            for (cell_ref, cell) in accepted {
                let old_cell = self.grid.get(&cell_ref).map(|r| r.clone());
                let new_cell = (!cell.is_empty()).then_some(cell);
                match &new_cell {
                    Some(cell) => {
                        self.grid.insert(cell_ref.clone(), cell.clone());
                    }
                    None => {
                        self.grid.remove(&cell_ref);
                    }
                }
                outcome.applied.push(cell_ref.clone());
                actions.push(UndoAction {
                    cell_ref,
                    old_cell,
                    new_cell,
                });
            }
        }
        tracing::debug!(
            applied = outcome.applied.len(),
            rejected = outcome.rejected.len(),
            "bulk write committed"
        );

        self.push_undo_batch(actions);
        self.modified = true;
        outcome
    }

    /// Set cell contents from input string.
    pub fn set_cell_from_input(&mut self, cell_ref: CellRef, input: &str) -> Result<()> {
        self.check_editable(&cell_ref)?;
        let cell = Cell::from_input(input);
        let state = (!cell.is_empty()).then_some(cell);
        self.push_undo(cell_ref.clone(), state.clone());
        self.put_cell(&cell_ref, state);
        self.modified = true;
        Ok(())
    }

    /// Clear the specified cell
    pub fn clear_cell(&mut self, cell_ref: &CellRef) -> Result<()> {
        self.check_editable(cell_ref)?;
        if self.grid.get(cell_ref).is_some() {
            self.push_undo(cell_ref.clone(), None);
            self.put_cell(cell_ref, None);
            self.modified = true;
        }
        Ok(())
    }

    /// Record the evaluated value of a formula cell.
    /// Returns false if the cell is not a formula.
    pub fn set_formula_value(&mut self, cell_ref: &CellRef, value: &str) -> bool {
        let _guard = self.write_guard();
        match self.grid.get_mut(cell_ref) {
            Some(mut cell) if matches!(cell.contents, CellType::Script(_)) => {
                cell.cached_value = Some(value.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn lock_cell(&mut self, cell_ref: CellRef) {
        self.locked.insert(cell_ref);
    }

    pub fn unlock_cell(&mut self, cell_ref: &CellRef) {
        self.locked.remove(cell_ref);
    }

    pub fn is_locked(&self, cell_ref: &CellRef) -> bool {
        self.locked.contains(cell_ref)
    }

    /// A copy of the cell at `cell_ref`, if populated.
    pub fn get_cell(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.grid.get(cell_ref).map(|cell| cell.clone())
    }

    /// Number of populated cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    /// Text shown for a cell: resolved value, or the formula source when
    /// nothing has evaluated it.
    pub fn get_cell_display(&self, cell_ref: &CellRef) -> String {
        match self.grid.get(cell_ref) {
            Some(cell) => match cell.resolved_text() {
                Some(text) => text.into_owned(),
                None => cell.to_input_string(),
            },
            None => String::new(),
        }
    }

    /// Apply history cell states under one commit.
    fn apply_history(&self, states: Vec<(CellRef, Option<Cell>)>) {
        let _guard = self.write_guard();
        for (cell_ref, state) in states {
            match state {
                Some(cell) => {
                    self.grid.insert(cell_ref, cell);
                }
                None => {
                    self.grid.remove(&cell_ref);
                }
            }
        }
    }

    /// Undo the last action
    pub fn undo(&mut self) -> Result<()> {
        let entry = self.undo_stack.pop().ok_or(GridseekError::NothingToUndo)?;

        match entry {
            UndoEntry::Single(action) => {
                // Push inverse to redo stack
                let current = self.grid.get(&action.cell_ref).map(|r| r.clone());
                self.redo_stack.push(UndoEntry::Single(UndoAction {
                    cell_ref: action.cell_ref.clone(),
                    old_cell: action.old_cell.clone(), // State after undo (for undo-after-redo)
                    new_cell: current,                 // State before undo (what redo restores)
                }));
                self.apply_history(vec![(action.cell_ref, action.old_cell)]);
            }
            UndoEntry::Batch(actions) => {
                // Build inverse batch for redo
                let mut redo_actions = Vec::with_capacity(actions.len());
                for action in &actions {
                    let current = self.grid.get(&action.cell_ref).map(|r| r.clone());
                    redo_actions.push(UndoAction {
                        cell_ref: action.cell_ref.clone(),
                        old_cell: action.old_cell.clone(),
                        new_cell: current,
                    });
                }
                self.redo_stack.push(UndoEntry::Batch(redo_actions));

                // Restore in reverse so repeated writes to one cell unwind correctly
                self.apply_history(
                    actions
                        .into_iter()
                        .rev()
                        .map(|action| (action.cell_ref, action.old_cell))
                        .collect(),
                );
            }
        }
        self.modified = true;
        Ok(())
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> Result<()> {
        let entry = self.redo_stack.pop().ok_or(GridseekError::NothingToRedo)?;

        match entry {
            UndoEntry::Single(action) => {
                // Push inverse to undo stack
                let current = self.grid.get(&action.cell_ref).map(|r| r.clone());
                self.undo_stack.push(UndoEntry::Single(UndoAction {
                    cell_ref: action.cell_ref.clone(),
                    old_cell: current,
                    new_cell: action.new_cell.clone(),
                }));
                self.apply_history(vec![(action.cell_ref, action.new_cell)]);
            }
            UndoEntry::Batch(actions) => {
                // Build inverse batch for undo
                let mut undo_actions = Vec::with_capacity(actions.len());
                for action in &actions {
                    let current = self.grid.get(&action.cell_ref).map(|r| r.clone());
                    undo_actions.push(UndoAction {
                        cell_ref: action.cell_ref.clone(),
                        old_cell: current,
                        new_cell: action.new_cell.clone(),
                    });
                }
                self.undo_stack.push(UndoEntry::Batch(undo_actions));

                self.apply_history(
                    actions
                        .into_iter()
                        .map(|action| (action.cell_ref, action.new_cell))
                        .collect(),
                );
            }
        }
        self.modified = true;
        Ok(())
    }
}

//! Find/replace over the grid.
//!
//! [`FindReplace`] owns the search and replace terms, the row-major list of
//! matching coordinates and the active-match cursor. The presentation layer
//! drives it with discrete [`FindCommand`]s; each command is one transition
//! of the state machine, handled in a single exhaustive match over
//! `(phase, command)`.
//!
//! Invariant: `active` is `Some(i)` with `i < matches.len()` exactly when
//! `matches` is non-empty.

use crate::error::WriteRejection;
use crate::store::GridStore;
use gridseek_engine::engine::{CellRef, GridRead, TextMatcher};
use std::collections::HashSet;

/// Coarse state of the find panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindPhase {
    Closed,
    OpenNoMatches,
    OpenHasMatches,
}

/// A user intent forwarded by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FindCommand {
    ToggleVisibility,
    SetSearchTerm(String),
    SetReplaceTerm(String),
    Next,
    Previous,
    ReplaceCurrent,
    ReplaceAll,
}

/// What a command did.
#[derive(Clone, Debug, PartialEq)]
pub enum FindOutcome {
    /// Nothing to act on: panel closed, no matches, or stale match.
    Unchanged,
    Opened { matches: usize },
    Closed,
    Searched { matches: usize },
    ReplaceTermSet,
    Moved { active: usize, cell: CellRef },
    Replaced { cell: CellRef, remaining: usize },
    ReplacedAll {
        replaced: Vec<CellRef>,
        skipped: Vec<WriteRejection>,
    },
    /// The store refused the write; matches are unchanged.
    Rejected(WriteRejection),
}

/// Read-only view of the find state for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindSnapshot {
    pub phase: FindPhase,
    pub search_term: String,
    pub replace_term: String,
    pub matches: Vec<CellRef>,
    pub active: Option<usize>,
}

impl FindSnapshot {
    pub fn active_cell(&self) -> Option<&CellRef> {
        self.active.and_then(|i| self.matches.get(i))
    }

    /// Badge text: "2 of 5", "No matches", or empty when there is no term.
    pub fn status_label(&self) -> String {
        match self.active {
            Some(i) => format!("{} of {}", i + 1, self.matches.len()),
            None if self.search_term.is_empty() => String::new(),
            None => "No matches".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FindReplace {
    visible: bool,
    search_term: String,
    replace_term: String,
    matcher: Option<TextMatcher>,
    matches: Vec<CellRef>,
    active: Option<usize>,
}

impl FindReplace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> FindPhase {
        match (self.visible, self.matches.is_empty()) {
            (false, _) => FindPhase::Closed,
            (true, true) => FindPhase::OpenNoMatches,
            (true, false) => FindPhase::OpenHasMatches,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn replace_term(&self) -> &str {
        &self.replace_term
    }

    pub fn matches(&self) -> &[CellRef] {
        &self.matches
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_cell(&self) -> Option<&CellRef> {
        self.active.and_then(|i| self.matches.get(i))
    }

    pub fn snapshot(&self) -> FindSnapshot {
        FindSnapshot {
            phase: self.phase(),
            search_term: self.search_term.clone(),
            replace_term: self.replace_term.clone(),
            matches: self.matches.clone(),
            active: self.active,
        }
    }

    /// Apply one command against a grid store.
    pub fn apply<S>(&mut self, command: FindCommand, store: &mut S) -> FindOutcome
    where
        S: GridStore + ?Sized,
    {
        let phase = self.phase();
        tracing::debug!(?phase, ?command, "find command");

        match (phase, command) {
            (FindPhase::Closed, FindCommand::ToggleVisibility) => {
                self.visible = true;
                self.refresh(&*store);
                FindOutcome::Opened {
                    matches: self.matches.len(),
                }
            }
            (FindPhase::OpenNoMatches | FindPhase::OpenHasMatches, FindCommand::ToggleVisibility) => {
                self.visible = false;
                FindOutcome::Closed
            }
            (_, FindCommand::SetSearchTerm(term)) => {
                self.set_search_term(term, &*store);
                FindOutcome::Searched {
                    matches: self.matches.len(),
                }
            }
            (_, FindCommand::SetReplaceTerm(term)) => {
                self.replace_term = term;
                FindOutcome::ReplaceTermSet
            }
            (
                FindPhase::Closed | FindPhase::OpenNoMatches,
                FindCommand::Next
                | FindCommand::Previous
                | FindCommand::ReplaceCurrent
                | FindCommand::ReplaceAll,
            ) => FindOutcome::Unchanged,
            (FindPhase::OpenHasMatches, FindCommand::Next) => self.step(1),
            (FindPhase::OpenHasMatches, FindCommand::Previous) => self.step(-1),
            (FindPhase::OpenHasMatches, FindCommand::ReplaceCurrent) => {
                self.replace_current(store)
            }
            (FindPhase::OpenHasMatches, FindCommand::ReplaceAll) => self.replace_all(store),
        }
    }

    /// Re-run the current search, keeping the cursor on the previously
    /// active coordinate when it still matches (else the next one after it).
    pub fn refresh<G>(&mut self, grid: &G)
    where
        G: GridRead + ?Sized,
    {
        let previous = self.active_cell().cloned();
        self.matches = match &self.matcher {
            Some(matcher) => matcher.find_matches(grid),
            None => Vec::new(),
        };
        self.active = match previous {
            Some(previous) => self.first_from(&previous, true),
            None => (!self.matches.is_empty()).then_some(0),
        };
    }

    fn set_search_term<G>(&mut self, term: String, grid: &G)
    where
        G: GridRead + ?Sized,
    {
        self.matcher = TextMatcher::new(&term);
        self.search_term = term;
        self.matches = match &self.matcher {
            Some(matcher) => matcher.find_matches(grid),
            None => Vec::new(),
        };
        self.active = (!self.matches.is_empty()).then_some(0);
    }

    /// Index of the first match at (or strictly after) `cell` in row-major
    /// order, wrapping to the first match.
    fn first_from(&self, cell: &CellRef, inclusive: bool) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let position = self
            .matches
            .iter()
            .position(|m| if inclusive { m >= cell } else { m > cell });
        Some(position.unwrap_or(0))
    }

    fn step(&mut self, delta: isize) -> FindOutcome {
        let len = self.matches.len();
        let Some(active) = self.active else {
            return FindOutcome::Unchanged;
        };
        let next = (active as isize + delta).rem_euclid(len as isize) as usize;
        self.active = Some(next);
        FindOutcome::Moved {
            active: next,
            cell: self.matches[next].clone(),
        }
    }

    fn replace_current<S>(&mut self, store: &mut S) -> FindOutcome
    where
        S: GridStore + ?Sized,
    {
        let (Some(matcher), Some(cell_ref)) = (self.matcher.clone(), self.active_cell().cloned())
        else {
            return FindOutcome::Unchanged;
        };

        let replacement = store
            .cell(&cell_ref)
            .and_then(|cell| matcher.replace_in_cell(&cell, &self.replace_term));
        let Some(new_cell) = replacement else {
            // The grid changed under us; resync instead of writing.
            self.refresh(&*store);
            return FindOutcome::Unchanged;
        };

        match store.set(cell_ref.clone(), new_cell) {
            Ok(()) => {
                self.matches = matcher.find_matches(&*store);
                self.active = self.first_from(&cell_ref, false);
                FindOutcome::Replaced {
                    cell: cell_ref,
                    remaining: self.matches.len(),
                }
            }
            Err(rejection) => {
                tracing::warn!(%rejection, "replace refused by grid store");
                FindOutcome::Rejected(rejection)
            }
        }
    }

    /// Single pass: matches written successfully leave the list without a
    /// re-scan, even if the replacement text contains the term again.
    fn replace_all<S>(&mut self, store: &mut S) -> FindOutcome
    where
        S: GridStore + ?Sized,
    {
        let Some(matcher) = self.matcher.clone() else {
            return FindOutcome::Unchanged;
        };

        let writes = self
            .matches
            .iter()
            .filter_map(|cell_ref| {
                let cell = store.cell(cell_ref)?;
                let new_cell = matcher.replace_in_cell(&cell, &self.replace_term)?;
                Some((cell_ref.clone(), new_cell))
            })
            .collect();
        let batch = store.set_many(writes);

        let skipped: HashSet<&CellRef> = batch.rejected.iter().map(|r| r.cell_ref()).collect();
        self.matches.retain(|cell_ref| skipped.contains(cell_ref));
        self.active = (!self.matches.is_empty()).then_some(0);

        tracing::debug!(
            replaced = batch.applied.len(),
            skipped = batch.rejected.len(),
            "replace all"
        );
        FindOutcome::ReplacedAll {
            replaced: batch.applied,
            skipped: batch.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use gridseek_engine::engine::{Cell, CellType};
    use proptest::prelude::*;

    fn cell(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn doc_with(cells: &[(&str, &str)]) -> Document {
        let mut doc = Document::new();
        for (name, input) in cells {
            doc.set_cell_from_input(cell(name), input).unwrap();
        }
        doc
    }

    fn open_with_term(doc: &mut Document, term: &str) -> FindReplace {
        let mut find = FindReplace::new();
        find.apply(FindCommand::ToggleVisibility, doc);
        find.apply(FindCommand::SetSearchTerm(term.to_string()), doc);
        find
    }

    #[test]
    fn test_search_orders_row_major_and_wraps() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foobar"), ("B1", "baz")]);
        let mut find = open_with_term(&mut doc, "foo");

        assert_eq!(find.matches(), &[cell("A1"), cell("A2")]);
        assert_eq!(find.active_index(), Some(0));
        assert_eq!(find.phase(), FindPhase::OpenHasMatches);

        find.apply(FindCommand::Next, &mut doc);
        assert_eq!(find.active_index(), Some(1));
        find.apply(FindCommand::Next, &mut doc);
        assert_eq!(find.active_index(), Some(0));
        find.apply(FindCommand::Previous, &mut doc);
        assert_eq!(find.active_index(), Some(1));
    }

    #[test]
    fn test_empty_term_has_no_matches() {
        let mut doc = doc_with(&[("A1", "foo")]);
        let mut find = open_with_term(&mut doc, "");
        assert_eq!(find.phase(), FindPhase::OpenNoMatches);
        assert_eq!(find.active_index(), None);
        assert_eq!(find.apply(FindCommand::Next, &mut doc), FindOutcome::Unchanged);
        assert_eq!(
            find.apply(FindCommand::ReplaceAll, &mut doc),
            FindOutcome::Unchanged
        );
        assert_eq!(find.snapshot().status_label(), "");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut doc = doc_with(&[("A1", "Apple"), ("B1", "pineAPPLE"), ("C1", "pear")]);
        let find = open_with_term(&mut doc, "apple");
        assert_eq!(find.matches(), &[cell("A1"), cell("B1")]);
        assert_eq!(find.snapshot().status_label(), "1 of 2");
    }

    #[test]
    fn test_very_long_term_is_found() {
        let long = "k".repeat(100_000);
        let mut doc = doc_with(&[("A1", long.as_str()), ("B2", "k")]);
        let mut find = open_with_term(&mut doc, &long.to_uppercase());
        assert_eq!(find.matches(), &[cell("A1")]);
        assert_eq!(find.snapshot().status_label(), "1 of 1");

        find.apply(FindCommand::SetReplaceTerm("short".to_string()), &mut doc);
        find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(doc.get_cell_display(&cell("A1")), "short");
        assert!(find.matches().is_empty());
    }

    #[test]
    fn test_replace_current_moves_to_next_remaining() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foobar"), ("B1", "baz")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::SetReplaceTerm("x".to_string()), &mut doc);

        let outcome = find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(
            outcome,
            FindOutcome::Replaced {
                cell: cell("A1"),
                remaining: 1
            }
        );
        assert_eq!(doc.get_cell_display(&cell("A1")), "x");
        assert_eq!(find.matches(), &[cell("A2")]);
        assert_eq!(find.active_index(), Some(0));
    }

    #[test]
    fn test_replace_current_replaces_every_occurrence_in_cell() {
        let mut doc = doc_with(&[("A1", "foofoo"), ("B1", "FOO and foo")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::SetReplaceTerm("bar".to_string()), &mut doc);

        find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(doc.get_cell_display(&cell("A1")), "barbar");
        assert_eq!(find.active_cell(), Some(&cell("B1")));

        find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(doc.get_cell_display(&cell("B1")), "bar and bar");
        assert_eq!(find.active_index(), None);
        assert_eq!(find.phase(), FindPhase::OpenNoMatches);
        assert_eq!(find.snapshot().status_label(), "No matches");
    }

    #[test]
    fn test_replace_current_wraps_past_last_match() {
        let mut doc = doc_with(&[("A1", "cat"), ("A2", "cat"), ("A3", "cat")]);
        let mut find = open_with_term(&mut doc, "cat");
        find.apply(FindCommand::SetReplaceTerm("dog".to_string()), &mut doc);
        find.apply(FindCommand::Previous, &mut doc); // A3

        find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(find.matches(), &[cell("A1"), cell("A2")]);
        assert_eq!(find.active_cell(), Some(&cell("A1")));
    }

    #[test]
    fn test_replace_current_on_number_keeps_number() {
        let mut doc = doc_with(&[("A1", "12345")]);
        let mut find = open_with_term(&mut doc, "23");
        find.apply(FindCommand::SetReplaceTerm("99".to_string()), &mut doc);
        find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(
            doc.grid.get(&cell("A1")).unwrap().contents,
            CellType::Number(19945.0)
        );
    }

    #[test]
    fn test_replace_current_rejected_leaves_matches() {
        let mut doc = doc_with(&[("A1", "=B1"), ("A2", "total")]);
        doc.set_formula_value(&cell("A1"), "total");
        let mut find = open_with_term(&mut doc, "total");
        assert_eq!(find.matches(), &[cell("A1"), cell("A2")]);

        let outcome = find.apply(FindCommand::ReplaceCurrent, &mut doc);
        assert_eq!(
            outcome,
            FindOutcome::Rejected(WriteRejection::FormulaCell(cell("A1")))
        );
        assert_eq!(find.matches(), &[cell("A1"), cell("A2")]);
        assert_eq!(find.active_index(), Some(0));
        assert!(matches!(
            doc.grid.get(&cell("A1")).unwrap().contents,
            CellType::Script(_)
        ));
    }

    #[test]
    fn test_replace_all_is_one_batch() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foobar"), ("B1", "baz")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::SetReplaceTerm("x".to_string()), &mut doc);
        let undo_depth = doc.undo_stack.len();

        let outcome = find.apply(FindCommand::ReplaceAll, &mut doc);
        assert_eq!(
            outcome,
            FindOutcome::ReplacedAll {
                replaced: vec![cell("A1"), cell("A2")],
                skipped: vec![],
            }
        );
        assert!(find.matches().is_empty());
        assert_eq!(find.active_index(), None);
        assert_eq!(doc.get_cell_display(&cell("A2")), "xbar");
        assert_eq!(doc.undo_stack.len(), undo_depth + 1);

        find.apply(FindCommand::SetSearchTerm("foo".to_string()), &mut doc);
        assert!(find.matches().is_empty());

        doc.undo().unwrap();
        assert_eq!(doc.get_cell_display(&cell("A1")), "foo");
        assert_eq!(doc.get_cell_display(&cell("A2")), "foobar");
    }

    #[test]
    fn test_replace_all_reports_skipped_and_keeps_them() {
        let mut doc = doc_with(&[("A1", "foo"), ("B1", "foo"), ("C1", "foo")]);
        doc.lock_cell(cell("B1"));
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::SetReplaceTerm("x".to_string()), &mut doc);

        let outcome = find.apply(FindCommand::ReplaceAll, &mut doc);
        assert_eq!(
            outcome,
            FindOutcome::ReplacedAll {
                replaced: vec![cell("A1"), cell("C1")],
                skipped: vec![WriteRejection::LockedCell(cell("B1"))],
            }
        );
        assert_eq!(find.matches(), &[cell("B1")]);
        assert_eq!(find.active_index(), Some(0));
    }

    #[test]
    fn test_replace_all_is_single_pass() {
        let mut doc = doc_with(&[("A1", "a"), ("A2", "ba")]);
        let mut find = open_with_term(&mut doc, "a");
        find.apply(FindCommand::SetReplaceTerm("aa".to_string()), &mut doc);
        find.apply(FindCommand::ReplaceAll, &mut doc);

        assert_eq!(doc.get_cell_display(&cell("A1")), "aa");
        assert_eq!(doc.get_cell_display(&cell("A2")), "baa");
        assert!(find.matches().is_empty());

        find.apply(FindCommand::SetSearchTerm("a".to_string()), &mut doc);
        assert_eq!(find.matches().len(), 2);
    }

    #[test]
    fn test_toggle_preserves_state() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foo"), ("A3", "foo")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::SetReplaceTerm("bar".to_string()), &mut doc);
        find.apply(FindCommand::Next, &mut doc);
        let before = find.snapshot();

        assert_eq!(
            find.apply(FindCommand::ToggleVisibility, &mut doc),
            FindOutcome::Closed
        );
        assert_eq!(find.phase(), FindPhase::Closed);
        assert_eq!(find.search_term(), "foo");

        assert_eq!(
            find.apply(FindCommand::ToggleVisibility, &mut doc),
            FindOutcome::Opened { matches: 3 }
        );
        assert_eq!(find.snapshot(), before);
    }

    #[test]
    fn test_closed_panel_ignores_navigation_and_replace() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foo")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::ToggleVisibility, &mut doc);

        assert_eq!(find.apply(FindCommand::Next, &mut doc), FindOutcome::Unchanged);
        assert_eq!(
            find.apply(FindCommand::ReplaceAll, &mut doc),
            FindOutcome::Unchanged
        );
        assert_eq!(find.active_index(), Some(0));
        assert_eq!(doc.get_cell_display(&cell("A1")), "foo");
    }

    #[test]
    fn test_search_term_set_while_closed_is_used_on_open() {
        let mut doc = doc_with(&[("A1", "foo"), ("B2", "xfoo")]);
        let mut find = FindReplace::new();
        find.apply(FindCommand::SetSearchTerm("FOO".to_string()), &mut doc);
        assert_eq!(find.phase(), FindPhase::Closed);

        doc.set_cell_from_input(cell("C3"), "foo!").unwrap();
        find.apply(FindCommand::ToggleVisibility, &mut doc);
        assert_eq!(find.matches(), &[cell("A1"), cell("B2"), cell("C3")]);
        assert_eq!(find.active_index(), Some(0));
    }

    #[test]
    fn test_refresh_follows_active_cell() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foo"), ("A3", "foo")]);
        let mut find = open_with_term(&mut doc, "foo");
        find.apply(FindCommand::Next, &mut doc); // A2

        doc.set_cell_from_input(cell("A1"), "nothing").unwrap();
        find.refresh(&doc);
        assert_eq!(find.active_cell(), Some(&cell("A2")));
        assert_eq!(find.active_index(), Some(0));

        doc.set_cell_from_input(cell("A2"), "gone").unwrap();
        find.refresh(&doc);
        assert_eq!(find.active_cell(), Some(&cell("A3")));
    }

    #[test]
    fn test_stale_match_resyncs_without_writing() {
        let mut doc = doc_with(&[("A1", "foo"), ("A2", "foo")]);
        let mut find = open_with_term(&mut doc, "foo");
        // Edited behind the engine's back
        doc.grid.insert(cell("A1"), Cell::new_text("other"));
        let undo_depth = doc.undo_stack.len();

        assert_eq!(
            find.apply(FindCommand::ReplaceCurrent, &mut doc),
            FindOutcome::Unchanged
        );
        assert_eq!(find.matches(), &[cell("A2")]);
        assert_eq!(doc.undo_stack.len(), undo_depth);
    }

    proptest! {
        #[test]
        fn next_then_previous_is_identity(count in 1usize..12, start in 0usize..12, forward in any::<bool>()) {
            let mut doc = Document::new();
            for row in 0..count {
                doc.set_cell_from_input(CellRef::new(0, row), "hit").unwrap();
            }
            let mut find = open_with_term(&mut doc, "hit");
            for _ in 0..(start % count) {
                find.apply(FindCommand::Next, &mut doc);
            }
            let before = find.active_index();

            let (first, second) = if forward {
                (FindCommand::Next, FindCommand::Previous)
            } else {
                (FindCommand::Previous, FindCommand::Next)
            };
            find.apply(first, &mut doc);
            find.apply(second, &mut doc);
            prop_assert_eq!(find.active_index(), before);
        }

        #[test]
        fn active_index_always_valid(
            texts in proptest::collection::vec("[ab]{0,3}", 1..10),
            steps in proptest::collection::vec(0u8..4, 0..12),
        ) {
            let mut doc = Document::new();
            for (row, text) in texts.iter().enumerate() {
                doc.set_cell_from_input(CellRef::new(0, row), text).unwrap();
            }
            let mut find = open_with_term(&mut doc, "a");
            find.apply(FindCommand::SetReplaceTerm("b".to_string()), &mut doc);

            for step in steps {
                let command = match step {
                    0 => FindCommand::Next,
                    1 => FindCommand::Previous,
                    2 => FindCommand::ReplaceCurrent,
                    _ => FindCommand::ReplaceAll,
                };
                find.apply(command, &mut doc);
                match find.active_index() {
                    Some(i) => prop_assert!(i < find.matches().len()),
                    None => prop_assert!(find.matches().is_empty()),
                }
            }
        }
    }
}

//! Case-insensitive literal matching over cell text.
//!
//! The search term is always treated literally: it is escaped before being
//! handed to `regex`, which only supplies Unicode-aware case folding and
//! leftmost-first replacement. Terms too large for the compiled-size
//! limits fall back to a char-by-char case-folded scan.

use regex::{NoExpand, Regex, RegexBuilder};
use std::borrow::Cow;

use super::cell::Cell;
use super::cell_ref::CellRef;
use super::store::GridRead;

/// The regex crate's default compiled-size limit.
const BASE_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Extra compiled-size budget per byte of search term.
const SIZE_PER_TERM_BYTE: usize = 4 * 1024;

#[derive(Clone, Debug)]
enum Pattern {
    Regex(Regex),
    Folded(Vec<char>),
}

/// A compiled, non-empty search term.
#[derive(Clone, Debug)]
pub struct TextMatcher {
    term: String,
    pattern: Pattern,
}

impl TextMatcher {
    /// Compile a search term. Returns `None` for an empty term, which
    /// matches nothing.
    pub fn new(term: &str) -> Option<TextMatcher> {
        if term.is_empty() {
            return None;
        }
        let limit = term
            .len()
            .saturating_mul(SIZE_PER_TERM_BYTE)
            .saturating_add(BASE_SIZE_LIMIT);
        let pattern = match RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .size_limit(limit)
            .dfa_size_limit(limit)
            .build()
        {
            Ok(regex) => Pattern::Regex(regex),
            Err(_) => Pattern::Folded(term.chars().collect()),
        };
        Some(TextMatcher {
            term: term.to_string(),
            pattern,
        })
    }

    /// A matcher that always uses the case-folded scan.
    #[cfg(test)]
    fn folded(term: &str) -> TextMatcher {
        TextMatcher {
            term: term.to_string(),
            pattern: Pattern::Folded(term.chars().collect()),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Pattern::Regex(regex) => regex.is_match(text),
            Pattern::Folded(needle) => find_folded(text, needle, 0).is_some(),
        }
    }

    /// Whether the cell's resolved text contains the term.
    pub fn matches_cell(&self, cell: &Cell) -> bool {
        cell.resolved_text().is_some_and(|text| self.is_match(&text))
    }

    /// Replace every occurrence of the term in `text`. The replacement is
    /// inserted verbatim (no `$1` expansion).
    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        let needle = match &self.pattern {
            Pattern::Regex(regex) => return regex.replace_all(text, NoExpand(replacement)),
            Pattern::Folded(needle) => needle,
        };
        let mut out = String::new();
        let mut last = 0;
        let mut found = false;
        while let Some((start, end)) = find_folded(text, needle, last) {
            out.push_str(&text[last..start]);
            out.push_str(replacement);
            last = end;
            found = true;
        }
        if !found {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }

    /// The cell that results from replacing every occurrence inside `cell`,
    /// or `None` when the cell has nothing to replace.
    pub fn replace_in_cell(&self, cell: &Cell, replacement: &str) -> Option<Cell> {
        let text = cell.resolved_text()?;
        if !self.is_match(&text) {
            return None;
        }
        let replaced = self.replace_all(&text, replacement).into_owned();
        Some(cell.with_replaced_text(replaced))
    }

    /// Every populated coordinate whose text contains the term, row-major.
    pub fn find_matches<G>(&self, grid: &G) -> Vec<CellRef>
    where
        G: GridRead + ?Sized,
    {
        grid.populated()
            .into_iter()
            .filter(|(_, cell)| self.matches_cell(cell))
            .map(|(cell_ref, _)| cell_ref)
            .collect()
    }
}

fn chars_fold_eq(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte span of the first case-folded occurrence of `needle` at or after
/// byte offset `from`. `needle` is non-empty.
fn find_folded(text: &str, needle: &[char], from: usize) -> Option<(usize, usize)> {
    for (offset, _) in text[from..].char_indices() {
        let start = from + offset;
        let mut chars = text[start..].char_indices();
        let mut end = start;
        let matched = needle.iter().all(|&want| match chars.next() {
            Some((i, got)) if chars_fold_eq(got, want) => {
                end = start + i + got.len_utf8();
                true
            }
            _ => false,
        });
        if matched {
            return Some((start, end));
        }
    }
    None
}

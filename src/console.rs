//! Line-based command console.
//!
//! Reads one command per line and prints one or more result lines. This is
//! the scripted front end to an [`EditorSession`]: everything a keyboard UI
//! would do to the find panel and the selection is reachable from here.

use crate::error::{CliError, Result};
use gridseek_core::{
    CellRef, EditorSession, FindCommand, FindOutcome, FindPhase, KeyChord, Keybindings,
    SelectionRange,
};
use std::io::{BufRead, Write};
use std::path::Path;

const HELP: &str = "\
commands:
  open | close | toggle        show or hide the find panel
  find [TEXT]                  set the search term (empty clears)
  with [TEXT]                  set the replacement text
  next | prev                  move the active match
  replace | replace-all        replace the active match / every match
  key CHORD                    press a key chord, e.g. C-f, S-F3
  select RANGE                 select cells, e.g. A1:B5
  stats                        count/sum/average of the selection
  set CELL [VALUE]             edit a cell (no value clears it)
  lock CELL | unlock CELL      protect a cell from writes
  undo | redo                  history
  show [CELL]                  find status, or one cell's value
  save [PATH]                  write the document
  quit                         leave";

enum Flow {
    Continue,
    Quit,
}

/// Run commands from `input` until EOF or `quit`.
pub fn run<R, W>(session: &mut EditorSession, keys: &Keybindings, input: R, mut out: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match execute(session, keys, trimmed, &mut out) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(CliError::Io(err)) => return Err(CliError::Io(err)),
            Err(err) => writeln!(out, "error: {}", err)?,
        }
    }
    out.flush()?;
    Ok(())
}

fn parse_cell(text: &str) -> Result<CellRef> {
    CellRef::from_str(text).ok_or_else(|| CliError::InvalidCell(text.to_string()))
}

fn execute<W: Write>(
    session: &mut EditorSession,
    keys: &Keybindings,
    line: &str,
    out: &mut W,
) -> Result<Flow> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    tracing::debug!(command, "console command");

    match command.to_ascii_lowercase().as_str() {
        "open" | "close" => {
            let want_open = command.eq_ignore_ascii_case("open");
            if session.find().is_visible() != want_open {
                let outcome = session.dispatch(FindCommand::ToggleVisibility);
                report(session, &outcome, out)?;
            } else {
                writeln!(out, "{}", panel_status(session))?;
            }
        }
        "toggle" => dispatch(session, FindCommand::ToggleVisibility, out)?,
        "find" => dispatch(session, FindCommand::SetSearchTerm(rest.to_string()), out)?,
        "with" => dispatch(session, FindCommand::SetReplaceTerm(rest.to_string()), out)?,
        "next" => dispatch(session, FindCommand::Next, out)?,
        "prev" | "previous" => dispatch(session, FindCommand::Previous, out)?,
        "replace" => dispatch(session, FindCommand::ReplaceCurrent, out)?,
        "replace-all" => dispatch(session, FindCommand::ReplaceAll, out)?,
        "key" => {
            let chord = KeyChord::parse(rest).map_err(CliError::Usage)?;
            match session.handle_key(&chord, keys) {
                Some(outcome) => report(session, &outcome, out)?,
                None => writeln!(out, "{} is not bound", chord)?,
            }
        }
        "select" => {
            let range =
                SelectionRange::parse(rest).ok_or_else(|| CliError::InvalidRange(rest.to_string()))?;
            session.select_range(range);
            write_stats(session, out)?;
        }
        "stats" => write_stats(session, out)?,
        "set" => {
            let (cell, value) = match rest.split_once(char::is_whitespace) {
                Some((cell, value)) => (cell, value.trim()),
                None => (rest, ""),
            };
            let cell_ref = parse_cell(cell)?;
            session.edit_cell(cell_ref.clone(), value)?;
            writeln!(
                out,
                "{} = {}",
                cell_ref,
                session.document.get_cell_display(&cell_ref)
            )?;
        }
        "lock" => {
            let cell_ref = parse_cell(rest)?;
            session.document.lock_cell(cell_ref.clone());
            writeln!(out, "locked {}", cell_ref)?;
        }
        "unlock" => {
            let cell_ref = parse_cell(rest)?;
            session.document.unlock_cell(&cell_ref);
            writeln!(out, "unlocked {}", cell_ref)?;
        }
        "undo" => {
            session.undo()?;
            writeln!(out, "undone; {}", panel_status(session))?;
        }
        "redo" => {
            session.redo()?;
            writeln!(out, "redone; {}", panel_status(session))?;
        }
        "show" => {
            if rest.is_empty() {
                writeln!(out, "{}", panel_status(session))?;
            } else {
                let cell_ref = parse_cell(rest)?;
                writeln!(
                    out,
                    "{} = {}",
                    cell_ref,
                    session.document.get_cell_display(&cell_ref)
                )?;
            }
        }
        "save" => {
            let path = if rest.is_empty() {
                session.document.save_file()?
            } else {
                let path = Path::new(rest);
                session.document.save_as(path)?;
                path.to_path_buf()
            };
            writeln!(out, "saved {}", path.display())?;
        }
        "help" => writeln!(out, "{}", HELP)?,
        "quit" | "exit" => return Ok(Flow::Quit),
        _ => {
            return Err(CliError::Usage(format!(
                "unknown command '{}' (try 'help')",
                command
            )));
        }
    }
    Ok(Flow::Continue)
}

fn dispatch<W: Write>(session: &mut EditorSession, command: FindCommand, out: &mut W) -> Result<()> {
    let outcome = session.dispatch(command);
    report(session, &outcome, out)
}

fn report<W: Write>(session: &EditorSession, outcome: &FindOutcome, out: &mut W) -> Result<()> {
    match outcome {
        FindOutcome::Unchanged => writeln!(out, "nothing to do; {}", panel_status(session))?,
        FindOutcome::Opened { .. } => writeln!(out, "opened; {}", panel_status(session))?,
        FindOutcome::Closed => writeln!(out, "closed")?,
        FindOutcome::Searched { .. } => writeln!(out, "{}", panel_status(session))?,
        FindOutcome::ReplaceTermSet => {
            writeln!(out, "replace with '{}'", session.find().replace_term())?
        }
        FindOutcome::Moved { .. } => writeln!(out, "{}", panel_status(session))?,
        FindOutcome::Replaced { cell, .. } => writeln!(
            out,
            "replaced {} = {}; {}",
            cell,
            session.document.get_cell_display(cell),
            panel_status(session)
        )?,
        FindOutcome::ReplacedAll { replaced, skipped } => {
            writeln!(out, "replaced {} cell(s)", replaced.len())?;
            for rejection in skipped {
                writeln!(out, "skipped {}", rejection)?;
            }
        }
        FindOutcome::Rejected(rejection) => writeln!(out, "refused: {}", rejection)?,
    }
    Ok(())
}

/// One-line summary of the find panel, e.g. `find 'foo': 2 of 5 at B3`.
pub fn panel_status(session: &EditorSession) -> String {
    let snapshot = session.find_snapshot();
    if snapshot.phase == FindPhase::Closed {
        return "find closed".to_string();
    }
    let label = snapshot.status_label();
    match snapshot.active_cell() {
        Some(cell) => format!("find '{}': {} at {}", snapshot.search_term, label, cell),
        None if label.is_empty() => "find: no search term".to_string(),
        None => format!("find '{}': {}", snapshot.search_term, label),
    }
}

fn write_stats<W: Write>(session: &EditorSession, out: &mut W) -> Result<()> {
    match (session.selection(), session.aggregate()) {
        (None, _) => writeln!(out, "no selection")?,
        (Some(range), None) => writeln!(out, "{}: single cell", range)?,
        (Some(range), Some(summary)) => writeln!(out, "{}: {}", range, summary.status_text())?,
    }
    Ok(())
}

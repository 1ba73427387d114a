use super::Document;
use crate::error::{GridseekError, Result};
use crate::storage::{parse_csv, parse_grd, write_csv, write_grd};
use gridseek_engine::engine::{Cell, CellRef};
use std::path::{Path, PathBuf};

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

impl Document {
    /// Replace the grid contents in one commit. Observers keep their handle.
    fn replace_contents(&mut self, cells: Vec<(CellRef, Cell)>) {
        {
            let _guard = self.write_guard();
            self.grid.clear();
            for (cell_ref, cell) in cells {
                self.grid.insert(cell_ref, cell);
            }
        }
        self.locked.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Load from file. `.csv` is imported, anything else is read as `.grd`.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let cells = if is_csv(path) {
            parse_csv(path, 0, 0)?
        } else {
            parse_grd(path)?
        };
        tracing::debug!(path = %path.display(), cells = cells.len(), "loaded document");

        self.replace_contents(cells);
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(GridseekError::NoFilePath);
        };
        self.save_as(&path)?;
        Ok(path)
    }

    /// Save to a path, choosing the format from its extension, and make it
    /// the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        if is_csv(path) {
            write_csv(path, self, None)?;
        } else {
            write_grd(path, &*self)?;
        }
        tracing::debug!(path = %path.display(), "saved document");
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

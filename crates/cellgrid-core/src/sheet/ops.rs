use super::Sheet;
use crate::error::{CellgridError, Result};
use cellgrid_engine::engine::{Cell, CellRef, detect_cycle};
use std::collections::BTreeSet;
use tracing::{debug, warn};

impl Sheet {
    /// Set a cell by name (`"B3"`) from user input.
    pub fn set_cell(&mut self, name: &str, input: &str) -> Result<Vec<CellRef>> {
        let cell_ref = name.parse::<CellRef>().map_err(CellgridError::InvalidCellRef)?;
        self.set_cell_from_input(cell_ref, input)
    }

    /// Store user input as the raw value of `cell_ref`.
    ///
    /// Returns every cell whose display value was invalidated by the change,
    /// in row-major order. A formula that would make the cell reach itself is
    /// rejected and the previous raw value is kept.
    pub fn set_cell_from_input(&mut self, cell_ref: CellRef, input: &str) -> Result<Vec<CellRef>> {
        let cell = Cell::from_input(input);
        if cell.is_empty() {
            return Ok(self.clear_cell(&cell_ref));
        }

        let is_script = cell.is_script();
        let old_cell = self.grid.insert(cell_ref, cell);

        if is_script && let Some(path) = detect_cycle(&cell_ref, &self.grid) {
            match old_cell {
                Some(c) => {
                    self.grid.insert(cell_ref, c);
                }
                None => {
                    self.grid.remove(&cell_ref);
                }
            }
            warn!(cell = %cell_ref, input, "rejected edit: circular dependency");
            return Err(CellgridError::CircularDependency { path });
        }

        debug!(cell = %cell_ref, input, "cell updated");
        Ok(self.propagate_change(&cell_ref))
    }

    /// Clear the specified cell. Returns the invalidated dependents.
    pub fn clear_cell(&mut self, cell_ref: &CellRef) -> Vec<CellRef> {
        if self.grid.remove(cell_ref).is_none() {
            return Vec::new();
        }
        debug!(cell = %cell_ref, "cell cleared");
        self.propagate_change(cell_ref)
    }

    fn propagate_change(&mut self, cell_ref: &CellRef) -> Vec<CellRef> {
        self.value_cache.remove(cell_ref);
        self.rebuild_dependents();
        let invalidated = self.mark_dependents_dirty(cell_ref);
        if !invalidated.is_empty() {
            debug!(
                cell = %cell_ref,
                count = invalidated.len(),
                "invalidated dependents"
            );
        }
        invalidated
    }

    /// Mark all cells that depend (transitively) on the changed cell as dirty.
    fn mark_dependents_dirty(&mut self, changed_cell: &CellRef) -> Vec<CellRef> {
        let mut to_process = vec![*changed_cell];
        let mut visited = BTreeSet::new();
        while let Some(cell_ref) = to_process.pop() {
            let Some(deps) = self.dependents.get(&cell_ref) else {
                continue;
            };
            for dep in deps {
                if !visited.insert(*dep) {
                    continue;
                }
                if let Some(mut cell) = self.grid.get_mut(dep) {
                    cell.dirty = true;
                    cell.cached_value = None;
                }
                self.value_cache.remove(dep);
                to_process.push(*dep);
            }
        }
        visited.remove(changed_cell);
        visited.into_iter().collect()
    }
}

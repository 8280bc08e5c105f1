use super::Sheet;
use crate::error::Result;
use cellgrid_engine::engine::{
    CellRef, CellType, Dynamic, detect_cycle, eval_formula, format_dynamic, format_number,
};
use std::collections::HashSet;
use tracing::debug;

/// Display value of a formula that failed to evaluate.
pub const ERROR_DISPLAY: &str = "#ERR!";
/// Display value of a formula that reaches itself.
pub const CYCLE_DISPLAY: &str = "#CYCLE!";

impl Sheet {
    /// Get the display value for a cell.
    ///
    /// Formula cells are evaluated on demand: referenced formulas are
    /// resolved first, then the result is cached until an input changes.
    pub fn get_cell_display(&self, cell_ref: &CellRef) -> String {
        let mut visiting = HashSet::new();
        self.resolve(*cell_ref, &mut visiting)
    }

    fn resolve(&self, cell_ref: CellRef, visiting: &mut HashSet<CellRef>) -> String {
        // Copy out what we need; the grid guard must not outlive this block.
        let (script, deps) = {
            let Some(cell) = self.grid.get(&cell_ref) else {
                return String::new();
            };
            match &cell.contents {
                CellType::Empty => return String::new(),
                CellType::Text(s) => return s.clone(),
                CellType::Number(n) => return format_number(*n),
                CellType::Script(s) => {
                    if !cell.dirty
                        && let Some(cached) = &cell.cached_value
                    {
                        return cached.clone();
                    }
                    (s.clone(), cell.depends_on.clone())
                }
            }
        };

        if !visiting.insert(cell_ref) || detect_cycle(&cell_ref, &self.grid).is_some() {
            return CYCLE_DISPLAY.to_string();
        }
        for dep in deps {
            self.resolve(dep, visiting);
        }
        visiting.remove(&cell_ref);

        let shown = match eval_formula(&self.engine, &script, Some(&cell_ref)) {
            Ok(value) => {
                let shown = format_dynamic(&value);
                self.value_cache.insert(cell_ref, value);
                shown
            }
            Err(err) => {
                debug!(cell = %cell_ref, error = %err, "formula failed");
                self.value_cache.remove(&cell_ref);
                ERROR_DISPLAY.to_string()
            }
        };

        if let Some(mut cell) = self.grid.get_mut(&cell_ref) {
            cell.cached_value = Some(shown.clone());
            cell.dirty = false;
        }
        debug!(cell = %cell_ref, value = %shown, "recomputed");
        shown
    }

    /// Evaluate every formula cell so all cached values are current.
    pub fn recalculate(&self) {
        let mut formulas: Vec<CellRef> = self
            .grid
            .iter()
            .filter(|entry| entry.value().is_script())
            .map(|entry| *entry.key())
            .collect();
        formulas.sort();
        for cell_ref in formulas {
            self.get_cell_display(&cell_ref);
        }
    }

    /// Evaluate a formula against the sheet without storing it.
    /// A leading `=` is optional.
    pub fn eval_expression(&self, formula: &str) -> Result<Dynamic> {
        let formula = formula.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        self.recalculate();
        Ok(eval_formula(&self.engine, formula, None)?)
    }
}

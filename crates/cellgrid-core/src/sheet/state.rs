use cellgrid_engine::engine::{CellRef, Engine, Grid, ValueCache, create_engine, new_grid};
use std::collections::{BTreeSet, HashMap};

/// In-memory state of the 26x10 sheet.
///
/// Each cell keeps its raw value in `grid`. Formula results live in the
/// shared `value_cache` and in each cell's cached display string; both are
/// invalidated through `dependents` whenever an input changes.
pub struct Sheet {
    /// Raw cell values (shared with the engine's built-ins)
    pub grid: Grid,
    /// Rhai engine for evaluating formulas
    pub engine: Engine,
    /// Evaluated formula values (shared with the engine's built-ins)
    pub value_cache: ValueCache,
    /// Reverse dependency map: cell -> cells whose formulas read it
    pub dependents: HashMap<CellRef, BTreeSet<CellRef>>,
}

impl Sheet {
    /// Create an empty sheet. Side-effect free.
    pub fn new() -> Self {
        let grid = new_grid();
        let value_cache = ValueCache::default();
        let engine = create_engine(grid.clone(), value_cache.clone());

        Sheet {
            grid,
            engine,
            value_cache,
            dependents: HashMap::new(),
        }
    }

    /// The raw value of a cell as the user would edit it.
    pub fn get_raw(&self, cell_ref: &CellRef) -> String {
        self.grid
            .get(cell_ref)
            .map(|cell| cell.to_input_string())
            .unwrap_or_default()
    }

    /// Cells whose formulas reference `cell_ref` directly.
    pub fn dependents_of(&self, cell_ref: &CellRef) -> Vec<CellRef> {
        self.dependents
            .get(cell_ref)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether no cell holds a value.
    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|entry| entry.value().is_empty())
    }

    /// Rebuild the reverse dependency map from the grid.
    pub(crate) fn rebuild_dependents(&mut self) {
        self.dependents.clear();
        for entry in self.grid.iter() {
            for dep in &entry.value().depends_on {
                self.dependents
                    .entry(*dep)
                    .or_default()
                    .insert(*entry.key());
            }
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

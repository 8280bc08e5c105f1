//! Rhai engine creation and formula evaluation.
//!
//! The engine shares the grid and value cache with the sheet, so built-ins
//! such as `CELL` always read the current contents.

use rhai::{Engine, EvalAltResult};

use super::{CellRef, Dynamic, Grid, ValueCache, preprocess_script_with_context};

/// Create a Rhai engine with built-ins registered and a shared value cache.
pub fn create_engine(grid: Grid, value_cache: ValueCache) -> Engine {
    let mut engine = Engine::new();
    // Formulas are single expressions; keep runaway scripts bounded.
    engine.set_max_operations(100_000);
    engine.set_max_call_levels(32);
    crate::builtins::register_builtins(&mut engine, grid, value_cache);
    engine
}

/// Preprocess and evaluate a formula (without the leading `=`).
///
/// `context` is the cell the formula belongs to, used for `ROW()`/`COL()`.
pub fn eval_formula(
    engine: &Engine,
    formula: &str,
    context: Option<&CellRef>,
) -> Result<Dynamic, Box<EvalAltResult>> {
    let processed = preprocess_script_with_context(formula, context);
    tracing::trace!(formula, %processed, "evaluating formula");
    engine.eval::<Dynamic>(&processed)
}

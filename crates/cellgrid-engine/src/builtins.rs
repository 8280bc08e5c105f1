//! Built-in spreadsheet functions (Rust) and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing built-in names are ALL CAPS (e.g. `SUM`, `ROUND`).
//! - Range built-ins rewrite to `<NAME>_RANGE(c1, r1, c2, r2)`.
//! - If you add a new built-in range function, update `RANGE_BUILTINS` and
//!   register its implementation in `register_builtins`.

use crate::engine::{CellRef, CellType, Grid, ValueCache, format_dynamic, normalize_range};
use regex::Regex;
use rhai::{Dynamic, Engine, EvalAltResult, NativeCallContext, Position};

use std::cell::Cell as DepthCounter;
use std::sync::OnceLock;

pub struct RangeBuiltin {
    pub sheet_name: &'static str,
    pub rhai_name: &'static str,
    pub description: &'static str,
}

pub const RANGE_BUILTINS: &[RangeBuiltin] = &[
    RangeBuiltin {
        sheet_name: "SUM",
        rhai_name: "SUM_RANGE",
        description: "Sum of numeric values in a cell range",
    },
    RangeBuiltin {
        sheet_name: "AVG",
        rhai_name: "AVG_RANGE",
        description: "Average of numeric values in a cell range",
    },
    RangeBuiltin {
        sheet_name: "COUNT",
        rhai_name: "COUNT_RANGE",
        description: "Count of non-empty cells in a cell range",
    },
    RangeBuiltin {
        sheet_name: "MIN",
        rhai_name: "MIN_RANGE",
        description: "Minimum numeric value in a cell range",
    },
    RangeBuiltin {
        sheet_name: "MAX",
        rhai_name: "MAX_RANGE",
        description: "Maximum numeric value in a cell range",
    },
];

/// Nested fallback evaluations allowed before a reference chain is treated
/// as an error.
const MAX_EVAL_DEPTH: usize = 16;

thread_local! {
    static EVAL_DEPTH: DepthCounter<usize> = const { DepthCounter::new(0) };
}

/// Regex that matches built-in range calls like `SUM(A0:B5)`.
///
/// Captures:
/// - group 1: function name (e.g. `SUM`)
/// - group 2: start cell ref (e.g. `A0`)
/// - group 3: end cell ref (e.g. `B5`)
pub fn range_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = RANGE_BUILTINS
            .iter()
            .map(|b| b.sheet_name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(
            r"\b({})\(\s*([A-Za-z][0-9])\s*:\s*([A-Za-z][0-9])\s*\)",
            names
        ))
        .expect("built-in range regex must compile")
    })
}

pub fn range_rhai_name(sheet_name: &str) -> Option<&'static str> {
    RANGE_BUILTINS
        .iter()
        .find(|b| b.sheet_name == sheet_name)
        .map(|b| b.rhai_name)
}

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn to_cell_ref(col: i64, row: i64) -> Result<CellRef, Box<EvalAltResult>> {
    usize::try_from(col)
        .ok()
        .zip(usize::try_from(row).ok())
        .and_then(|(col, row)| CellRef::checked(col, row))
        .ok_or_else(|| invalid_arg(&format!("cell ({}, {}) is outside the grid", col, row)))
}

/// Tracks nesting of fallback evaluations on this thread.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<DepthGuard, Box<EvalAltResult>> {
        EVAL_DEPTH.with(|depth| {
            if depth.get() >= MAX_EVAL_DEPTH {
                return Err(invalid_arg("reference chain too deep"));
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVAL_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Evaluate a formula cell that has no cached value yet.
fn eval_script_cell(
    ctx: &NativeCallContext,
    script: &str,
    cell_ref: &CellRef,
) -> Result<Dynamic, Box<EvalAltResult>> {
    let _guard = DepthGuard::enter()?;
    let processed = crate::engine::preprocess_script_with_context(script, Some(cell_ref));
    ctx.engine().eval::<Dynamic>(&processed)
}

/// Typed value of a cell: unit for empty, number, text, or the evaluated formula.
fn lookup_value(
    ctx: &NativeCallContext,
    grid: &Grid,
    value_cache: &ValueCache,
    cell_ref: CellRef,
) -> Result<Dynamic, Box<EvalAltResult>> {
    if let Some(cached) = value_cache.get(&cell_ref) {
        return Ok(cached.clone());
    }

    // Copy the formula out so no grid guard is held while evaluating.
    let script = match grid.get(&cell_ref) {
        None => return Ok(Dynamic::UNIT),
        Some(entry) => match &entry.contents {
            CellType::Empty => return Ok(Dynamic::UNIT),
            CellType::Number(n) => return Ok(Dynamic::from(*n)),
            CellType::Text(s) => return Ok(Dynamic::from(s.clone())),
            CellType::Script(s) => s.clone(),
        },
    };
    eval_script_cell(ctx, &script, &cell_ref)
}

/// Numeric view of a value. `None` for text and other non-numbers.
fn as_number(value: &Dynamic) -> Option<f64> {
    if value.is_unit() {
        return Some(0.0);
    }
    if let Ok(n) = value.as_float() {
        return Some(n);
    }
    if let Ok(n) = value.as_int() {
        return Some(n as f64);
    }
    value.as_bool().ok().map(|b| if b { 1.0 } else { 0.0 })
}

fn is_blank(value: &Dynamic) -> bool {
    value.is_unit() || (value.is_string() && value.clone().into_string().is_ok_and(|s| s.is_empty()))
}

/// Collect the values of a rectangular range.
fn range_values(
    ctx: &NativeCallContext,
    grid: &Grid,
    value_cache: &ValueCache,
    c1: i64,
    r1: i64,
    c2: i64,
    r2: i64,
) -> Result<Vec<Dynamic>, Box<EvalAltResult>> {
    let (top_left, bottom_right) = normalize_range(to_cell_ref(c1, r1)?, to_cell_ref(c2, r2)?);
    let mut values = Vec::new();
    for row in top_left.row..=bottom_right.row {
        for col in top_left.col..=bottom_right.col {
            values.push(lookup_value(ctx, grid, value_cache, CellRef::new(col, row))?);
        }
    }
    Ok(values)
}

fn numbers(values: &[Dynamic]) -> impl Iterator<Item = f64> + '_ {
    values.iter().map(|v| as_number(v).unwrap_or(0.0))
}

fn round_to(x: f64, decimals: i64) -> Result<f64, Box<EvalAltResult>> {
    const MAX_DECIMALS: i64 = 12;
    if !(0..=MAX_DECIMALS).contains(&decimals) {
        return Err(invalid_arg(&format!(
            "decimals must be between 0 and {}",
            MAX_DECIMALS
        )));
    }
    let factor = 10f64.powi(decimals as i32);
    Ok((x * factor).round() / factor)
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine, grid: Grid, value_cache: ValueCache) {
    // CELL(col, row): numeric value at cell (empty -> 0, text -> NaN)
    let grid_cell = grid.clone();
    let cache_cell = value_cache.clone();
    engine.register_fn(
        "CELL",
        move |ctx: NativeCallContext, col: i64, row: i64| -> Result<f64, Box<EvalAltResult>> {
            let cell_ref = to_cell_ref(col, row)?;
            let value = lookup_value(&ctx, &grid_cell, &cache_cell, cell_ref)?;
            Ok(as_number(&value).unwrap_or(f64::NAN))
        },
    );

    // VALUE(col, row): typed value at cell; empty -> ""
    let grid_value = grid.clone();
    let cache_value = value_cache.clone();
    engine.register_fn(
        "VALUE",
        move |ctx: NativeCallContext, col: i64, row: i64| -> Result<Dynamic, Box<EvalAltResult>> {
            let cell_ref = to_cell_ref(col, row)?;
            let value = lookup_value(&ctx, &grid_value, &cache_value, cell_ref)?;
            if value.is_unit() {
                Ok(Dynamic::from(String::new()))
            } else {
                Ok(value)
            }
        },
    );

    let grid_sum = grid.clone();
    let cache_sum = value_cache.clone();
    engine.register_fn(
        "SUM_RANGE",
        move |ctx: NativeCallContext, c1: i64, r1: i64, c2: i64, r2: i64| -> Result<f64, Box<EvalAltResult>> {
            let values = range_values(&ctx, &grid_sum, &cache_sum, c1, r1, c2, r2)?;
            Ok(numbers(&values).sum())
        },
    );

    let grid_avg = grid.clone();
    let cache_avg = value_cache.clone();
    engine.register_fn(
        "AVG_RANGE",
        move |ctx: NativeCallContext, c1: i64, r1: i64, c2: i64, r2: i64| -> Result<f64, Box<EvalAltResult>> {
            let values = range_values(&ctx, &grid_avg, &cache_avg, c1, r1, c2, r2)?;
            // Range corners are in-grid, so there is always at least one cell.
            Ok(numbers(&values).sum::<f64>() / values.len() as f64)
        },
    );

    let grid_count = grid.clone();
    let cache_count = value_cache.clone();
    engine.register_fn(
        "COUNT_RANGE",
        move |ctx: NativeCallContext, c1: i64, r1: i64, c2: i64, r2: i64| -> Result<f64, Box<EvalAltResult>> {
            let values = range_values(&ctx, &grid_count, &cache_count, c1, r1, c2, r2)?;
            Ok(values.iter().filter(|v| !is_blank(v)).count() as f64)
        },
    );

    let grid_min = grid.clone();
    let cache_min = value_cache.clone();
    engine.register_fn(
        "MIN_RANGE",
        move |ctx: NativeCallContext, c1: i64, r1: i64, c2: i64, r2: i64| -> Result<f64, Box<EvalAltResult>> {
            let values = range_values(&ctx, &grid_min, &cache_min, c1, r1, c2, r2)?;
            Ok(numbers(&values).fold(f64::INFINITY, f64::min))
        },
    );

    let grid_max = grid;
    let cache_max = value_cache;
    engine.register_fn(
        "MAX_RANGE",
        move |ctx: NativeCallContext, c1: i64, r1: i64, c2: i64, r2: i64| -> Result<f64, Box<EvalAltResult>> {
            let values = range_values(&ctx, &grid_max, &cache_max, c1, r1, c2, r2)?;
            Ok(numbers(&values).fold(f64::NEG_INFINITY, f64::max))
        },
    );

    // Scalar helpers
    engine.register_fn("ROUND", round_to);
    engine.register_fn("ROUND", |x: i64, decimals: i64| round_to(x as f64, decimals));
    engine.register_fn("ABS", |x: f64| x.abs());
    engine.register_fn("ABS", |x: i64| -> Result<i64, Box<EvalAltResult>> {
        x.checked_abs().ok_or_else(|| invalid_arg("ABS overflow"))
    });
    engine.register_fn("IF", |cond: bool, then: Dynamic, otherwise: Dynamic| {
        if cond { then } else { otherwise }
    });
    engine.register_fn("CONCAT", |a: Dynamic, b: Dynamic| {
        format!("{}{}", format_dynamic(&a), format_dynamic(&b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_fn_re_captures() {
        let caps = range_fn_re().captures("1 + MAX( a0 : C4 )").unwrap();
        assert_eq!(&caps[1], "MAX");
        assert_eq!(&caps[2], "a0");
        assert_eq!(&caps[3], "C4");
        assert!(range_fn_re().captures("SUM(A0)").is_none());
        assert!(range_fn_re().captures("RESUM(A0:A1)").is_none());
    }

    #[test]
    fn test_range_rhai_name() {
        assert_eq!(range_rhai_name("AVG"), Some("AVG_RANGE"));
        assert_eq!(range_rhai_name("avg"), None);
    }

    #[test]
    fn test_round_to_bounds() {
        assert_eq!(round_to(2.346, 2).unwrap(), 2.35);
        assert_eq!(round_to(2.5, 0).unwrap(), 3.0);
        assert!(round_to(1.0, -1).is_err());
        assert!(round_to(1.0, 13).is_err());
    }

    #[test]
    fn test_depth_guard_limits_nesting() {
        let guards: Vec<_> = (0..MAX_EVAL_DEPTH)
            .map(|_| DepthGuard::enter().unwrap())
            .collect();
        assert!(DepthGuard::enter().is_err());
        drop(guards);
        assert!(DepthGuard::enter().is_ok());
    }
}

//! Spreadsheet engine API.
//!
//! This module provides the computation side of the sheet:
//!
//! - [`Cell`], [`CellType`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`] - Cell identifiers (`A0` through `Z9`)
//! - [`detect_cycle`] - Circular reference detection
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`preprocess_script`] - Transform formulas for Rhai evaluation
//! - [`create_engine`] - Create a Rhai engine with built-in functions
//! - [`format_dynamic`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod preprocess;

pub use cell::{Cell, CellType, Grid, ValueCache, new_grid};
pub use cell_ref::{CellRef, GRID_COLS, GRID_ROWS};
pub use cycle::detect_cycle;
pub use deps::{extract_dependencies, normalize_range, parse_range};
pub use eval::{create_engine, eval_formula};
pub use format::{format_dynamic, format_number};
pub use preprocess::{preprocess_script, preprocess_script_with_context};

pub use rhai::{Dynamic, Engine, EvalAltResult};

//! cellgrid_engine - Formula engine for the fixed 26x10 grid.

pub mod builtins;
pub mod engine;

//! cellgrid-core - UI-agnostic sheet model.

pub mod error;
pub mod export;
pub mod machine;
pub mod sheet;

pub use error::{CellgridError, Result};
pub use machine::{CellEditor, EditEvent, EditState, PendingEdit, Step, Transition};
pub use sheet::Sheet;

pub use cellgrid_engine::engine::{CellRef, GRID_COLS, GRID_ROWS};

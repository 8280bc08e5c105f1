//! Sheet state and logic (UI-agnostic).

mod eval;
mod ops;
mod state;

pub use eval::{CYCLE_DISPLAY, ERROR_DISPLAY};
pub use state::Sheet;

//! Error types for cellgrid core.

use thiserror::Error;

use cellgrid_engine::engine::{CellRef, EvalAltResult};

/// Errors that can occur while editing or evaluating the sheet.
#[derive(Error, Debug)]
pub enum CellgridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Circular dependency detected: {}", format_path(.path))]
    CircularDependency { path: Vec<CellRef> },

    #[error("{0}")]
    InvalidCellRef(String),

    #[error("Rhai error: {0}")]
    Rhai(
        #[from]
        #[source]
        Box<EvalAltResult>,
    ),
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, CellgridError>;

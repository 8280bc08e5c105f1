//! Cell contents and the shared grid storage.
//!
//! - [`CellType`] - what the user typed: nothing, text, a number, or a formula
//! - [`Cell`] - contents plus dependency list and cached display state
//! - [`Grid`] - shared sparse storage for cells (backed by `DashMap`)
//! - [`ValueCache`] - shared evaluated values read by formula built-ins

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cell_ref::CellRef;
use super::deps::extract_dependencies;

/// The raw value stored in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    /// Formula text without the leading `=`.
    Script(String),
}

/// A cell in the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
    pub depends_on: Vec<CellRef>,
    pub dirty: bool,
    /// Cached display string for formula cells.
    #[serde(skip)]
    pub cached_value: Option<String>,
}

impl Cell {
    fn literal(contents: CellType) -> Cell {
        Cell {
            contents,
            depends_on: Vec::new(),
            dirty: false,
            cached_value: None,
        }
    }

    pub fn new_empty() -> Cell {
        Cell::literal(CellType::Empty)
    }

    pub fn new_text(text: &str) -> Cell {
        Cell::literal(CellType::Text(text.to_string()))
    }

    pub fn new_number(n: f64) -> Cell {
        Cell::literal(CellType::Number(n))
    }

    /// Create a formula cell. Dependencies are extracted from the formula.
    pub fn new_script(script: &str) -> Cell {
        Cell {
            depends_on: extract_dependencies(script),
            contents: CellType::Script(script.to_string()),
            dirty: true,
            cached_value: None,
        }
    }

    /// Parse user input into a cell.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Script (without the '=')
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }

        if let Some(formula) = trimmed.strip_prefix('=') {
            return Cell::new_script(formula.trim());
        }

        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            return Cell::new_text(&trimmed[1..trimmed.len() - 1]);
        }

        // `f64::from_str` also accepts "inf" and "NaN"; those stay text.
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::new_number(n),
            _ => Cell::new_text(trimmed),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.contents, CellType::Empty)
    }

    pub fn is_script(&self) -> bool {
        matches!(self.contents, CellType::Script(_))
    }

    /// The raw value as the user would edit it.
    pub fn to_input_string(&self) -> String {
        match &self.contents {
            CellType::Empty => String::new(),
            CellType::Text(s) if Cell::from_input(s).contents == self.contents => s.clone(),
            // Quote text that would otherwise re-enter as a number or formula.
            CellType::Text(s) => format!("\"{}\"", s),
            CellType::Number(n) => n.to_string(),
            CellType::Script(s) => format!("={}", s),
        }
    }
}

/// Shared sparse grid storage. Clones share the same map.
pub type Grid = Arc<DashMap<CellRef, Cell>>;

/// Evaluated values of formula cells, shared with the engine built-ins so a
/// reference reads the computed value instead of re-evaluating.
pub type ValueCache = Arc<DashMap<CellRef, rhai::Dynamic>>;

pub fn new_grid() -> Grid {
    Arc::new(DashMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_classifies() {
        assert!(Cell::from_input("   ").is_empty());
        assert_eq!(Cell::from_input("42").contents, CellType::Number(42.0));
        assert_eq!(Cell::from_input("-1.5").contents, CellType::Number(-1.5));
        assert_eq!(
            Cell::from_input("hello").contents,
            CellType::Text("hello".into())
        );
        assert_eq!(
            Cell::from_input("\"12\"").contents,
            CellType::Text("12".into())
        );
        assert_eq!(
            Cell::from_input("inf").contents,
            CellType::Text("inf".into())
        );
    }

    #[test]
    fn test_from_input_formula_records_dependencies() {
        let cell = Cell::from_input("= A0 + B1");
        assert_eq!(cell.contents, CellType::Script("A0 + B1".into()));
        assert_eq!(cell.depends_on, vec![CellRef::new(0, 0), CellRef::new(1, 1)]);
        assert!(cell.dirty);
    }

    #[test]
    fn test_to_input_string_restores_equals() {
        assert_eq!(Cell::from_input("=A0*2").to_input_string(), "=A0*2");
        assert_eq!(Cell::from_input("3").to_input_string(), "3");
        assert_eq!(Cell::from_input("2.5").to_input_string(), "2.5");
    }

    #[test]
    fn test_to_input_string_round_trips_text() {
        for input in ["hello", "\"007\"", "\"=x\"", "\" padded \"", "\"\"quoted\"\"", "\"\""] {
            let cell = Cell::from_input(input);
            let again = Cell::from_input(&cell.to_input_string());
            assert_eq!(again.contents, cell.contents, "input {input:?}");
        }
        assert_eq!(Cell::from_input("hello").to_input_string(), "hello");
        assert_eq!(Cell::from_input("\"007\"").to_input_string(), "\"007\"");
    }
}

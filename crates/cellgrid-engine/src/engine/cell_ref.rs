//! Cell identifiers for the fixed grid.
//!
//! A cell is named by a column letter (`A`-`Z`) followed by a row digit
//! (`0`-`9`), so the whole sheet is `A0` through `Z9`. Internally both parts
//! are zero-indexed and the row index is the row digit itself.
//!
//! # Examples
//!
//! ```
//! use cellgrid_engine::engine::CellRef;
//!
//! let cell: CellRef = "C7".parse().unwrap();
//! assert_eq!(cell.col, 2);
//! assert_eq!(cell.row, 7);
//! assert_eq!(cell.to_string(), "C7");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Number of columns in the grid (`A` through `Z`).
pub const GRID_COLS: usize = 26;
/// Number of rows in the grid (`0` through `9`).
pub const GRID_ROWS: usize = 10;

/// A reference to a cell by column and row indices (0-indexed).
///
/// Field order makes the derived ordering row-major.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Build a reference only if it lies inside the grid.
    pub fn checked(col: usize, row: usize) -> Option<CellRef> {
        (col < GRID_COLS && row < GRID_ROWS).then(|| CellRef::new(col, row))
    }

    /// Parse an identifier such as `A0` or `z9`. Returns `None` for anything
    /// outside the grid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        Self::parse_name(name)
    }

    fn parse_name(name: &str) -> Option<CellRef> {
        let caps = cell_name_re().captures(name)?;
        let letter = caps["col"].as_bytes()[0].to_ascii_uppercase();
        let digit = caps["row"].as_bytes()[0];
        CellRef::checked((letter - b'A') as usize, (digit - b'0') as usize)
    }

    /// Column letter for a column index (0 -> `A`, 25 -> `Z`).
    pub fn col_to_letter(col: usize) -> char {
        debug_assert!(col < GRID_COLS);
        (b'A' + (col % GRID_COLS) as u8) as char
    }

    /// Move by a delta, clamping to the grid edges.
    pub fn offset_clamped(self, delta_col: isize, delta_row: isize) -> CellRef {
        let col = self.col.saturating_add_signed(delta_col).min(GRID_COLS - 1);
        let row = self.row.saturating_add_signed(delta_row).min(GRID_ROWS - 1);
        CellRef::new(col, row)
    }
}

fn cell_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<col>[A-Za-z])(?<row>[0-9])$").expect("cell name regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s.trim()).ok_or_else(|| {
            format!(
                "Invalid cell reference: {} (expected A0-{}{})",
                s,
                CellRef::col_to_letter(GRID_COLS - 1),
                GRID_ROWS - 1
            )
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letter(self.col), self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corners() {
        assert_eq!(CellRef::from_str("A0"), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::from_str("Z9"), Some(CellRef::new(25, 9)));
        assert_eq!(CellRef::from_str("z9"), Some(CellRef::new(25, 9)));
    }

    #[test]
    fn test_parse_rejects_outside_grid() {
        for name in ["", "A", "0", "A10", "AA1", "1A", "A 1", "A-1", "É1"] {
            assert!(CellRef::from_str(name).is_none(), "{name} should not parse");
        }
    }

    #[test]
    fn test_fromstr_trait_reports_error() {
        let err = "Q12".parse::<CellRef>().unwrap_err();
        assert!(err.contains("Q12"));
        assert!(err.contains("Z9"));
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut cells = vec![CellRef::new(0, 1), CellRef::new(25, 0), CellRef::new(1, 0)];
        cells.sort();
        assert_eq!(cells, vec![CellRef::new(1, 0), CellRef::new(25, 0), CellRef::new(0, 1)]);
    }

    #[test]
    fn test_offset_clamped() {
        let a0 = CellRef::new(0, 0);
        assert_eq!(a0.offset_clamped(-1, -1), a0);
        assert_eq!(a0.offset_clamped(100, 100), CellRef::new(25, 9));
        assert_eq!(CellRef::new(3, 4).offset_clamped(1, -1), CellRef::new(4, 3));
    }
}

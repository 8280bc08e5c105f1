//! Markdown export of the evaluated sheet.

use crate::error::Result;
use crate::sheet::Sheet;
use cellgrid_engine::engine::CellRef;
use std::fmt::Write as _;
use std::path::Path;

/// Render the populated area of the sheet (from `A0` to the last used column
/// and row) as a markdown table of display values.
pub fn to_markdown(sheet: &Sheet) -> String {
    let Some((max_col, max_row)) = used_bounds(sheet) else {
        return "*Empty sheet*\n".to_string();
    };

    let mut out = String::new();
    out.push_str("|   |");
    for col in 0..=max_col {
        let _ = write!(out, " {} |", CellRef::col_to_letter(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in 0..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in 0..=max_row {
        let _ = write!(out, "| {} |", row);
        for col in 0..=max_col {
            let display = sheet.get_cell_display(&CellRef::new(col, row));
            let _ = write!(out, " {} |", escape_markdown(&display));
        }
        out.push('\n');
    }

    out
}

/// Write the markdown table to a file.
pub fn write_markdown(path: &Path, sheet: &Sheet) -> Result<()> {
    std::fs::write(path, to_markdown(sheet))?;
    Ok(())
}

fn used_bounds(sheet: &Sheet) -> Option<(usize, usize)> {
    sheet
        .grid
        .iter()
        .filter(|entry| !entry.value().is_empty())
        .map(|entry| (entry.key().col, entry.key().row))
        .reduce(|(c1, r1), (c2, r2)| (c1.max(c2), r1.max(r2)))
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

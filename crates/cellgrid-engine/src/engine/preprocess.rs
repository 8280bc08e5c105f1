//! Formula preprocessing.
//!
//! Formulas are written against cell names; Rhai sees function calls:
//!
//! - `A0` -> `CELL(0, 0)` (numeric value)
//! - `@A0` -> `VALUE(0, 0)` (typed value)
//! - `SUM(A0:B3)` -> `SUM_RANGE(0, 0, 1, 3)` (col, row, col, row)
//! - `ROW()` / `COL()` -> the evaluating cell's row digit / 1-based column
//!
//! Text inside string literals is never rewritten.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Rewrite a formula into an evaluable Rhai script.
pub fn preprocess_script(script: &str) -> String {
    preprocess_script_with_context(script, None)
}

/// Rewrite a formula, resolving `ROW()`/`COL()` against `context`.
pub fn preprocess_script_with_context(script: &str, context: Option<&CellRef>) -> String {
    map_outside_strings(script, |seg| {
        let seg = replace_ranges(seg);
        let seg = match context {
            Some(cell_ref) => {
                let seg = row_fn_re().replace_all(&seg, cell_ref.row.to_string());
                col_fn_re()
                    .replace_all(&seg, (cell_ref.col + 1).to_string())
                    .to_string()
            }
            None => seg,
        };
        replace_cell_refs(&seg)
    })
}

fn replace_ranges(seg: &str) -> String {
    crate::builtins::range_fn_re()
        .replace_all(seg, |caps: &Captures| {
            let (Some(rhai_name), Some(start), Some(end)) = (
                crate::builtins::range_rhai_name(&caps[1]),
                CellRef::from_str(&caps[2]),
                CellRef::from_str(&caps[3]),
            ) else {
                return caps[0].to_string();
            };
            format!(
                "{}({}, {}, {}, {})",
                rhai_name, start.col, start.row, end.col, end.row
            )
        })
        .to_string()
}

fn replace_cell_refs(seg: &str) -> String {
    let seg = value_ref_re().replace_all(seg, |caps: &Captures| match CellRef::from_str(&caps[1]) {
        Some(cr) => format!("VALUE({}, {})", cr.col, cr.row),
        None => caps[0].to_string(),
    });
    super::deps::cell_ref_re()
        .replace_all(&seg, |caps: &Captures| match CellRef::from_str(&caps[1]) {
            Some(cr) => format!("CELL({}, {})", cr.col, cr.row),
            None => caps[0].to_string(),
        })
        .to_string()
}

/// Apply `f` to every segment of `script` that is outside a string literal.
fn map_outside_strings(script: &str, f: impl Fn(&str) -> String) -> String {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                continue;
            }
            if b == b'"' && backslashes % 2 == 0 {
                out.push_str(&script[seg_start..=i]);
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
        } else if b == b'"' {
            out.push_str(&f(&script[seg_start..i]));
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
    }

    if seg_start < script.len() {
        if in_string {
            out.push_str(&script[seg_start..]);
        } else {
            out.push_str(&f(&script[seg_start..]));
        }
    }

    out
}

fn value_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@([A-Za-z][0-9])\b").expect("typed reference regex must compile"))
}

fn row_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bROW\(\s*\)").expect("ROW() regex must compile"))
}

fn col_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bCOL\(\s*\)").expect("COL() regex must compile"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_plain_and_typed_refs() {
        assert_eq!(preprocess_script("A0 + b1"), "CELL(0, 0) + CELL(1, 1)");
        assert_eq!(preprocess_script("len(@Z9)"), "len(VALUE(25, 9))");
    }

    #[test]
    fn test_preprocess_ranges() {
        assert_eq!(
            preprocess_script("SUM(A0:B3) / COUNT(A0:A3)"),
            "SUM_RANGE(0, 0, 1, 3) / COUNT_RANGE(0, 0, 0, 3)"
        );
    }

    #[test]
    fn test_preprocess_leaves_strings_alone() {
        assert_eq!(
            preprocess_script(r#"CONCAT("A0 \"B1\"", @C2)"#),
            r#"CONCAT("A0 \"B1\"", VALUE(2, 2))"#
        );
    }

    #[test]
    fn test_preprocess_leaves_ranges_in_strings_alone() {
        assert_eq!(
            preprocess_script(r#""SUM(A1:A2)" + SUM(A1:A2)"#),
            r#""SUM(A1:A2)" + SUM_RANGE(0, 1, 0, 2)"#
        );
    }

    #[test]
    fn test_preprocess_row_col_with_context() {
        let ctx = CellRef::new(2, 7);
        assert_eq!(
            preprocess_script_with_context("ROW() * 10 + COL()", Some(&ctx)),
            "7 * 10 + 3"
        );
        assert_eq!(preprocess_script("ROW()"), "ROW()");
    }

    #[test]
    fn test_preprocess_ignores_out_of_grid_names() {
        assert_eq!(preprocess_script("A10 + x1y"), "A10 + x1y");
    }
}

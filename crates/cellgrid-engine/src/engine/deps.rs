//! Dependency extraction from formula strings.
//!
//! Finds every cell a formula reads so the sheet can build its reverse
//! dependency map and detect cycles. Handles:
//! - Plain references: `A0`, `c3`
//! - Typed references: `@A0`
//! - Range arguments to range built-ins: `SUM(A0:B3)`
//!
//! References inside string literals are ignored.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Extract all cell references from a formula, in order of appearance.
/// Duplicates are removed.
pub fn extract_dependencies(script: &str) -> Vec<CellRef> {
    let mut deps = Vec::new();
    let script = strip_string_literals(script);

    let range_re = crate::builtins::range_fn_re();
    for caps in range_re.captures_iter(&script) {
        if let (Some(start), Some(end)) = (CellRef::from_str(&caps[2]), CellRef::from_str(&caps[3]))
        {
            let (top_left, bottom_right) = normalize_range(start, end);
            for row in top_left.row..=bottom_right.row {
                for col in top_left.col..=bottom_right.col {
                    push_unique(&mut deps, CellRef::new(col, row));
                }
            }
        }
    }

    // Remove range calls so their corners are not counted twice.
    let without_ranges = range_re.replace_all(&script, "");
    for caps in cell_ref_re().captures_iter(&without_ranges) {
        if let Some(cr) = CellRef::from_str(&caps[1]) {
            push_unique(&mut deps, cr);
        }
    }

    deps
}

fn push_unique(deps: &mut Vec<CellRef>, cell: CellRef) {
    if !deps.contains(&cell) {
        deps.push(cell);
    }
}

/// Order two corners so the first is top-left and the second bottom-right.
pub fn normalize_range(a: CellRef, b: CellRef) -> (CellRef, CellRef) {
    (
        CellRef::new(a.col.min(b.col), a.row.min(b.row)),
        CellRef::new(a.col.max(b.col), a.row.max(b.row)),
    )
}

/// Matches a single in-grid reference, with or without the `@` prefix.
pub(crate) fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z][0-9])\b").expect("dependency cell reference regex must compile")
    })
}

/// Blank out the contents of double-quoted string literals, keeping byte
/// offsets stable.
pub(crate) fn strip_string_literals(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in script.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
                out.push('"');
                continue;
            }
            out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
        } else {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
        }
    }

    out
}

/// Parse a range like `A0:B3` into its (unordered) corners.
pub fn parse_range(range: &str) -> Option<(CellRef, CellRef)> {
    let (start, end) = range.split_once(':')?;
    Some((
        CellRef::from_str(start.trim())?,
        CellRef::from_str(end.trim())?,
    ))
}

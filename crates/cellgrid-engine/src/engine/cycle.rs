//! Circular reference detection.
//!
//! A formula may not reach itself through its references (`A0 -> B0 -> A0`).
//! The sheet checks this before accepting an edit, and again before
//! evaluating, using a depth-first walk over `depends_on`.

use std::collections::HashSet;

use super::{CellRef, Grid};

/// Detect a cycle reachable from `start`.
/// Returns the path ending in the repeated cell, or `None`.
pub fn detect_cycle(start: &CellRef, grid: &Grid) -> Option<Vec<CellRef>> {
    let mut visiting = HashSet::new();
    let mut done = HashSet::new();
    let mut path = Vec::new();

    if visit(*start, grid, &mut visiting, &mut done, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn visit(
    current: CellRef,
    grid: &Grid,
    visiting: &mut HashSet<CellRef>,
    done: &mut HashSet<CellRef>,
    path: &mut Vec<CellRef>,
) -> bool {
    if visiting.contains(&current) {
        path.push(current);
        return true;
    }
    if done.contains(&current) {
        return false;
    }

    // Copy out before recursing so no map guard is held across the walk.
    let deps = match grid.get(&current) {
        Some(entry) => entry.depends_on.clone(),
        None => return false,
    };

    visiting.insert(current);
    path.push(current);

    for dep in deps {
        if visit(dep, grid, visiting, done, path) {
            return true;
        }
    }

    path.pop();
    visiting.remove(&current);
    done.insert(current);
    false
}

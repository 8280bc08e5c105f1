use cellgrid_core::sheet::{CYCLE_DISPLAY, ERROR_DISPLAY};
use cellgrid_core::{CellEditor, CellRef, CellgridError, EditEvent, Sheet};
use cellgrid_engine::engine::format_dynamic;

fn cell(name: &str) -> CellRef {
    CellRef::from_str(name).unwrap()
}

fn display(sheet: &Sheet, name: &str) -> String {
    sheet.get_cell_display(&cell(name))
}

#[test]
fn test_literals_display_as_entered() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "hello").unwrap();
    sheet.set_cell("B0", "3.50").unwrap();
    sheet.set_cell("C0", "\"42\"").unwrap();
    assert_eq!(display(&sheet, "A0"), "hello");
    assert_eq!(display(&sheet, "B0"), "3.5");
    assert_eq!(display(&sheet, "C0"), "42");
    assert_eq!(display(&sheet, "D0"), "");
}

#[test]
fn test_dependents_recompute_when_input_changes() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "2").unwrap();
    sheet.set_cell("B0", "=A0 * 10").unwrap();
    assert_eq!(display(&sheet, "B0"), "20");

    sheet.set_cell("A0", "5").unwrap();
    assert_eq!(display(&sheet, "B0"), "50");
}

#[test]
fn test_nested_references_resolve_recursively() {
    let mut sheet = Sheet::new();
    sheet.set_cell("D0", "=C0 + 1").unwrap();
    sheet.set_cell("C0", "=B0 + 1").unwrap();
    sheet.set_cell("B0", "=A0 + 1").unwrap();
    sheet.set_cell("A0", "1").unwrap();
    assert_eq!(display(&sheet, "D0"), "4");

    sheet.set_cell("A0", "10").unwrap();
    assert_eq!(display(&sheet, "D0"), "13");
    assert_eq!(display(&sheet, "B0"), "11");
}

#[test]
fn test_set_cell_reports_transitive_dependents() {
    let mut sheet = Sheet::new();
    sheet.set_cell("B0", "=A0").unwrap();
    sheet.set_cell("C5", "=B0 + A0").unwrap();
    sheet.set_cell("A1", "=SUM(B0:C5)").unwrap();
    sheet.set_cell("Z9", "=1").unwrap();

    let invalidated = sheet.set_cell("A0", "1").unwrap();
    assert_eq!(invalidated, vec![cell("B0"), cell("A1"), cell("C5")]);
    assert_eq!(sheet.dependents_of(&cell("A0")), vec![cell("B0"), cell("C5")]);
}

#[test]
fn test_cached_value_survives_unrelated_edits() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "1").unwrap();
    sheet.set_cell("B0", "=A0 + 1").unwrap();
    assert_eq!(display(&sheet, "B0"), "2");

    let invalidated = sheet.set_cell("Z9", "100").unwrap();
    assert!(invalidated.is_empty());
    assert!(!sheet.grid.get(&cell("B0")).unwrap().dirty);
}

#[test]
fn test_circular_edit_is_rejected_and_old_value_kept() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "=B0 + 1").unwrap();
    sheet.set_cell("B0", "3").unwrap();

    let err = sheet.set_cell("B0", "=A0").unwrap_err();
    match err {
        CellgridError::CircularDependency { path } => {
            assert_eq!(path, vec![cell("B0"), cell("A0"), cell("B0")]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(sheet.get_raw(&cell("B0")), "3");
    assert_eq!(display(&sheet, "A0"), "4");
}

#[test]
fn test_self_reference_is_rejected() {
    let mut sheet = Sheet::new();
    let err = sheet.set_cell("C3", "=C3 + 1").unwrap_err();
    assert_eq!(err.to_string(), "Circular dependency detected: C3 -> C3");
    assert_eq!(sheet.get_raw(&cell("C3")), "");
}

#[test]
fn test_cycle_display_when_grid_is_edited_directly() {
    let sheet = Sheet::new();
    sheet
        .grid
        .insert(cell("A0"), cellgrid_engine::engine::Cell::new_script("A0"));
    assert_eq!(display(&sheet, "A0"), CYCLE_DISPLAY);
}

#[test]
fn test_errors_render_and_propagate() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "=missing(1)").unwrap();
    sheet.set_cell("B0", "=A0 + 1").unwrap();
    assert_eq!(display(&sheet, "A0"), ERROR_DISPLAY);
    assert_eq!(display(&sheet, "B0"), ERROR_DISPLAY);

    sheet.set_cell("A0", "=1").unwrap();
    assert_eq!(display(&sheet, "B0"), "2");
}

#[test]
fn test_clearing_a_cell_recomputes_dependents() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "7").unwrap();
    sheet.set_cell("B0", "=A0 * 2").unwrap();
    assert_eq!(display(&sheet, "B0"), "14");

    assert_eq!(sheet.clear_cell(&cell("A0")), vec![cell("B0")]);
    assert_eq!(display(&sheet, "B0"), "0");

    // Entering whitespace clears as well.
    sheet.set_cell("A0", "3").unwrap();
    sheet.set_cell("A0", "   ").unwrap();
    assert!(sheet.grid.get(&cell("A0")).is_none());
    assert_eq!(display(&sheet, "B0"), "0");
}

#[test]
fn test_typed_references_and_text() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "Ada").unwrap();
    sheet.set_cell("B0", "=CONCAT(\"Hi \", @A0)").unwrap();
    sheet.set_cell("C0", "=A0 + 1").unwrap();
    assert_eq!(display(&sheet, "B0"), "Hi Ada");
    assert_eq!(display(&sheet, "C0"), "#NAN!");
}

#[test]
fn test_row_and_col_builtins_use_own_cell() {
    let mut sheet = Sheet::new();
    sheet.set_cell("E4", "=ROW() * 100 + COL()").unwrap();
    assert_eq!(display(&sheet, "E4"), "405");
}

#[test]
fn test_invalid_cell_name() {
    let mut sheet = Sheet::new();
    assert!(matches!(
        sheet.set_cell("A10", "1"),
        Err(CellgridError::InvalidCellRef(_))
    ));
}

#[test]
fn test_eval_expression_reads_current_values() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "4").unwrap();
    sheet.set_cell("A1", "=A0 * A0").unwrap();
    let value = sheet.eval_expression("=SUM(A0:A1)").unwrap();
    assert_eq!(format_dynamic(&value), "20");
    assert!(sheet.eval_expression("nope(").is_err());
}

#[test]
fn test_editor_commit_flows_into_sheet() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "1").unwrap();
    sheet.set_cell("B0", "=A0 + 1").unwrap();

    let mut editor = CellEditor::new();
    editor.select(&sheet, cell("A0"));
    editor.send(EditEvent::Backspace);
    editor.send(EditEvent::Insert('9'));

    // Clicking B0 commits A0 and opens B0 with its formula.
    let step = editor.select(&sheet, cell("B0"));
    let pending = step.commit.expect("blur commits");
    let invalidated = pending.apply(&mut sheet).unwrap();
    assert_eq!(invalidated, vec![cell("B0")]);
    assert_eq!(display(&sheet, "B0"), "10");
    assert_eq!(editor.buffer(), Some(("=A0 + 1", 7)));
}

#[test]
fn test_range_syntax_inside_text_is_kept() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A1", "2").unwrap();
    sheet.set_cell("A0", r#"="SUM(A1:A2)""#).unwrap();
    sheet.set_cell("B0", r#"=CONCAT("SUM(A1:A2) = ", SUM(A1:A2))"#).unwrap();
    assert_eq!(display(&sheet, "A0"), "SUM(A1:A2)");
    assert_eq!(display(&sheet, "B0"), "SUM(A1:A2) = 2");
}

#[test]
fn test_reopening_quoted_text_keeps_it_text() {
    let mut sheet = Sheet::new();
    sheet.set_cell("A0", "\"007\"").unwrap();
    sheet.set_cell("B0", "=@A0 + \"!\"").unwrap();
    assert_eq!(display(&sheet, "B0"), "007!");

    let mut editor = CellEditor::new();
    editor.select(&sheet, cell("A0"));
    let pending = editor.send(EditEvent::Commit).commit.expect("commit");
    pending.apply(&mut sheet).unwrap();

    assert_eq!(display(&sheet, "A0"), "007");
    assert_eq!(display(&sheet, "B0"), "007!");
}

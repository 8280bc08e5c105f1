//! Application state for the terminal UI.
//!
//! The [`App`] owns the sheet, the cell editor state machine and the grid
//! cursor. Every change to a cell goes through the editor, so committing,
//! cancelling and "click elsewhere commits" behave the same for keyboard and
//! mouse.

use cellgrid_core::{CellEditor, CellRef, EditEvent, GRID_COLS, Sheet, Step};

pub struct App {
    /// The sheet being edited
    pub sheet: Sheet,
    /// Edit state machine
    pub editor: CellEditor,
    /// Selected cell
    pub cursor: CellRef,
    /// First visible column
    pub viewport_col: usize,
    /// Number of columns that fit on screen
    pub visible_cols: usize,
    /// Display width of a column
    pub col_width: usize,
    /// Status message to display
    pub status_message: String,
    pub should_quit: bool,
}

impl App {
    pub fn new(sheet: Sheet, col_width: usize) -> Self {
        App {
            sheet,
            editor: CellEditor::new(),
            cursor: CellRef::new(0, 0),
            viewport_col: 0,
            visible_cols: GRID_COLS,
            col_width,
            status_message: String::new(),
            should_quit: false,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_editing()
    }

    /// Move the selection, clamped to the grid.
    pub fn move_cursor(&mut self, delta_col: isize, delta_row: isize) {
        self.cursor = self.cursor.offset_clamped(delta_col, delta_row);
        self.update_viewport();
    }

    /// Keep the cursor column inside the visible window.
    pub fn update_viewport(&mut self) {
        let visible = self.visible_cols.max(1);
        if self.cursor.col < self.viewport_col {
            self.viewport_col = self.cursor.col;
        } else if self.cursor.col >= self.viewport_col + visible {
            self.viewport_col = self.cursor.col + 1 - visible;
        }
        self.viewport_col = self.viewport_col.min(GRID_COLS.saturating_sub(visible));
    }

    /// Open the editor on the selected cell.
    pub fn begin_edit(&mut self) {
        let step = self.editor.select(&self.sheet, self.cursor);
        self.apply_step(step);
    }

    /// A click on `cell`: select it and open its editor. An edit already open
    /// on another cell is committed first.
    pub fn click(&mut self, cell: CellRef) {
        self.cursor = cell;
        self.update_viewport();
        self.begin_edit();
    }

    /// Forward an editing event to the state machine.
    pub fn edit(&mut self, event: EditEvent) {
        let step = self.editor.send(event);
        self.apply_step(step);
    }

    /// Commit the open edit and move the selection.
    pub fn commit_and_move(&mut self, delta_col: isize, delta_row: isize) {
        self.edit(EditEvent::Commit);
        self.move_cursor(delta_col, delta_row);
    }

    pub fn clear_current(&mut self) {
        let invalidated = self.sheet.clear_cell(&self.cursor);
        self.status_message = updated_message(self.cursor, invalidated.len());
    }

    fn apply_step(&mut self, step: Step) {
        let Some(pending) = step.commit else {
            return;
        };
        let cell = pending.cell;
        self.status_message = match pending.apply(&mut self.sheet) {
            Ok(invalidated) => updated_message(cell, invalidated.len()),
            Err(e) => format!("{}: {}", cell, e),
        };
    }

    /// Display value shown in the grid for `cell`.
    pub fn display(&self, cell: &CellRef) -> String {
        if self.editor.editing_cell() == Some(*cell)
            && let Some((buffer, _)) = self.editor.buffer()
        {
            return buffer.to_string();
        }
        self.sheet.get_cell_display(cell)
    }
}

fn updated_message(cell: CellRef, dependents: usize) -> String {
    match dependents {
        0 => format!("{} updated", cell),
        1 => format!("{} updated, 1 dependent recomputed", cell),
        n => format!("{} updated, {} dependents recomputed", cell, n),
    }
}

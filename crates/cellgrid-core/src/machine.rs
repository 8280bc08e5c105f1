//! Cell edit interaction as a finite state machine.
//!
//! A cell is either displayed or being edited. Selecting a cell opens an
//! editor seeded with its raw value; selecting a different cell while editing
//! commits the open edit first, the same way leaving an input field does.
//!
//! The machine never touches the sheet. Commits come back as a
//! [`PendingEdit`] for the caller to apply, and every event produces a
//! [`Transition`] record that is also logged.

use std::fmt;

use cellgrid_engine::engine::CellRef;
use tracing::debug;

use crate::error::Result;
use crate::sheet::Sheet;

/// Current state of the editor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditState {
    /// No cell is being edited.
    #[default]
    Idle,
    /// `cell` is open with `buffer`; `cursor` is a byte offset into it.
    Editing {
        cell: CellRef,
        buffer: String,
        cursor: usize,
    },
}

impl EditState {
    fn editing(cell: CellRef, raw: String) -> EditState {
        EditState::Editing {
            cell,
            cursor: raw.len(),
            buffer: raw,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            EditState::Idle => Phase::Idle,
            EditState::Editing { cell, .. } => Phase::Editing(*cell),
        }
    }
}

/// Input to the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditEvent {
    /// Open `cell`, seeding the buffer with its raw value.
    Select { cell: CellRef, raw: String },
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    Home,
    End,
    Commit,
    Cancel,
}

impl EditEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EditEvent::Select { .. } => "select",
            EditEvent::Insert(_) => "insert",
            EditEvent::Backspace => "backspace",
            EditEvent::Delete => "delete",
            EditEvent::MoveLeft => "move_left",
            EditEvent::MoveRight => "move_right",
            EditEvent::Home => "home",
            EditEvent::End => "end",
            EditEvent::Commit => "commit",
            EditEvent::Cancel => "cancel",
        }
    }
}

/// Coarse state used in transition records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Editing(CellRef),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Editing(cell) => write!(f, "editing({})", cell),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub event: &'static str,
    pub to: Phase,
}

/// A finished edit waiting to be written to the sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    pub cell: CellRef,
    pub input: String,
}

impl PendingEdit {
    /// Write the edit. Returns the invalidated dependents.
    pub fn apply(self, sheet: &mut Sheet) -> Result<Vec<CellRef>> {
        sheet.set_cell_from_input(self.cell, &self.input)
    }
}

/// Result of feeding one event to the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub transition: Transition,
    pub commit: Option<PendingEdit>,
}

#[derive(Debug, Default)]
pub struct CellEditor {
    state: EditState,
}

impl CellEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn editing_cell(&self) -> Option<CellRef> {
        match &self.state {
            EditState::Editing { cell, .. } => Some(*cell),
            EditState::Idle => None,
        }
    }

    /// Buffer and cursor of the open edit.
    pub fn buffer(&self) -> Option<(&str, usize)> {
        match &self.state {
            EditState::Editing { buffer, cursor, .. } => Some((buffer, *cursor)),
            EditState::Idle => None,
        }
    }

    /// Select `cell`, seeding the editor from the sheet.
    pub fn select(&mut self, sheet: &Sheet, cell: CellRef) -> Step {
        let raw = sheet.get_raw(&cell);
        self.send(EditEvent::Select { cell, raw })
    }

    /// Feed one event to the machine.
    pub fn send(&mut self, event: EditEvent) -> Step {
        let from = self.state.phase();
        let name = event.name();

        let (next, commit) = match (std::mem::take(&mut self.state), event) {
            (EditState::Idle, EditEvent::Select { cell, raw }) => (EditState::editing(cell, raw), None),
            (EditState::Idle, _) => (EditState::Idle, None),
            (EditState::Editing { cell, buffer, cursor }, event) => match event {
                EditEvent::Select { cell: next, .. } if next == cell => {
                    (EditState::Editing { cell, buffer, cursor }, None)
                }
                EditEvent::Select { cell: next, raw } => (
                    EditState::editing(next, raw),
                    Some(PendingEdit { cell, input: buffer }),
                ),
                EditEvent::Commit => (EditState::Idle, Some(PendingEdit { cell, input: buffer })),
                EditEvent::Cancel => (EditState::Idle, None),
                other => {
                    let (mut buffer, mut cursor) = (buffer, cursor);
                    edit_buffer(&mut buffer, &mut cursor, &other);
                    (EditState::Editing { cell, buffer, cursor }, None)
                }
            },
        };

        self.state = next;
        let transition = Transition {
            from,
            event: name,
            to: self.state.phase(),
        };
        debug!(
            from = %transition.from,
            event = transition.event,
            to = %transition.to,
            commit = commit.is_some(),
            "edit transition"
        );
        Step { transition, commit }
    }
}

fn edit_buffer(buffer: &mut String, cursor: &mut usize, event: &EditEvent) {
    match event {
        EditEvent::Insert(ch) => {
            buffer.insert(*cursor, *ch);
            *cursor += ch.len_utf8();
        }
        EditEvent::Backspace => {
            if let Some(prev) = buffer[..*cursor].chars().next_back() {
                *cursor -= prev.len_utf8();
                buffer.remove(*cursor);
            }
        }
        EditEvent::Delete => {
            if *cursor < buffer.len() {
                buffer.remove(*cursor);
            }
        }
        EditEvent::MoveLeft => {
            if let Some(prev) = buffer[..*cursor].chars().next_back() {
                *cursor -= prev.len_utf8();
            }
        }
        EditEvent::MoveRight => {
            if let Some(next) = buffer[*cursor..].chars().next() {
                *cursor += next.len_utf8();
            }
        }
        EditEvent::Home => *cursor = 0,
        EditEvent::End => *cursor = buffer.len(),
        EditEvent::Select { .. } | EditEvent::Commit | EditEvent::Cancel => {}
    }
}

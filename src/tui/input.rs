use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::prelude::*;
use std::io;

use super::app::App;
use super::ui;
use cellgrid_core::EditEvent;

fn handle_mouse_event(app: &mut App, terminal_area: Rect, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }

    let [_formula_area, grid_area, _status_area] = ui::split_main_chunks(terminal_area);
    if let Some(cell) = ui::grid_cell_at(app, grid_area, mouse.column, mouse.row) {
        app.click(cell);
    }
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_and_move(0, 1),
        KeyCode::Tab => app.commit_and_move(1, 0),
        KeyCode::Esc => {
            app.edit(EditEvent::Cancel);
            app.status_message.clear();
        }
        KeyCode::Backspace => app.edit(EditEvent::Backspace),
        KeyCode::Delete => app.edit(EditEvent::Delete),
        KeyCode::Left => app.edit(EditEvent::MoveLeft),
        KeyCode::Right => app.edit(EditEvent::MoveRight),
        KeyCode::Home => app.edit(EditEvent::Home),
        KeyCode::End => app.edit(EditEvent::End),
        KeyCode::Char(ch) => app.edit(EditEvent::Insert(ch)),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
        KeyCode::Tab => app.move_cursor(1, 0),
        KeyCode::Enter | KeyCode::F(2) | KeyCode::Char('i') => app.begin_edit(),
        KeyCode::Delete | KeyCode::Backspace => app.clear_current(),
        _ => {}
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if app.is_editing() {
        handle_edit_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            // Only process key press events (Windows reports Press + Release)
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                let terminal_area = Rect::new(0, 0, size.width, size.height);
                handle_mouse_event(app, terminal_area, mouse);
            }
            _ => {}
        }
    }
    Ok(())
}

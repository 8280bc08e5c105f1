//! UI rendering

use super::app::App;
use cellgrid_core::{CellRef, GRID_COLS, GRID_ROWS};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
/// Borders, header row and one line per grid row.
pub(crate) const GRID_HEIGHT: u16 = GRID_ROWS as u16 + 3;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 3;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Length(GRID_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Columns that fit in a grid area of the given width.
pub(crate) fn columns_that_fit(grid_width: u16, col_width: usize) -> usize {
    let inner = grid_width.saturating_sub(2 + ROW_HEADER_WIDTH) as usize;
    (inner / (col_width + GRID_COLUMN_SPACING as usize)).clamp(1, GRID_COLS)
}

/// Map a mouse position to the data cell under it.
pub(crate) fn grid_cell_at(
    app: &App,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<CellRef> {
    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_right = grid_area.x.saturating_add(grid_area.width).saturating_sub(1);
    let inner_bottom = grid_area.y.saturating_add(grid_area.height).saturating_sub(1);

    if mouse_col < inner_x || mouse_col >= inner_right || mouse_row < inner_y || mouse_row >= inner_bottom {
        return None;
    }

    // Header row contains column letters, not data cells.
    if mouse_row == inner_y {
        return None;
    }
    let row = (mouse_row - inner_y - 1) as usize;
    if row >= GRID_ROWS {
        return None;
    }

    let mut x = inner_x.saturating_add(ROW_HEADER_WIDTH + GRID_COLUMN_SPACING);
    if mouse_col < x {
        return None;
    }

    let width = app.col_width as u16;
    for offset in 0..app.visible_cols {
        let col = app.viewport_col + offset;
        if col >= GRID_COLS {
            break;
        }
        let cell_end = x.saturating_add(width);
        if mouse_col >= x && mouse_col < cell_end {
            return Some(CellRef::new(col, row));
        }
        x = cell_end.saturating_add(GRID_COLUMN_SPACING);
        if mouse_col < x || x >= inner_right {
            return None;
        }
    }

    None
}

/// Draw the application UI
pub fn draw(f: &mut Frame, app: &mut App) {
    let [formula_area, grid_area, status_area] = split_main_chunks(f.area());

    app.visible_cols = columns_that_fit(grid_area.width, app.col_width);
    app.update_viewport();

    draw_formula_bar(f, app, formula_area);
    draw_grid(f, app, grid_area);
    draw_status_bar(f, app, status_area);
}

fn draw_formula_bar(f: &mut Frame, app: &App, area: Rect) {
    let (title, content, color) = match app.editor.buffer() {
        Some((buffer, cursor)) => {
            let (before, after) = buffer.split_at(cursor);
            (" Edit ", format!("{}: {}│{}", app.cursor, before, after), Color::Yellow)
        }
        None => {
            let raw = app.sheet.get_raw(&app.cursor);
            let raw = if raw.is_empty() { "(empty)".to_string() } else { raw };
            (" Cell ", format!("{}: {}", app.cursor, raw), Color::White)
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(content).block(block), area);
}

fn header_style(active: bool) -> Style {
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let columns: Vec<usize> = (app.viewport_col..GRID_COLS).take(app.visible_cols).collect();

    let mut header_cells = vec![Cell::from(" ")];
    for &col in &columns {
        header_cells.push(
            Cell::from(CellRef::col_to_letter(col).to_string())
                .style(header_style(col == app.cursor.col)),
        );
    }
    let header = Row::new(header_cells).height(1);

    let rows = (0..GRID_ROWS).map(|row| {
        let mut cells = vec![Cell::from(row.to_string()).style(header_style(row == app.cursor.row))];
        for &col in &columns {
            let cell_ref = CellRef::new(col, row);
            let style = if cell_ref == app.cursor {
                if app.is_editing() {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                }
            } else {
                Style::default()
            };
            cells.push(Cell::from(app.display(&cell_ref)).style(style));
        }
        Row::new(cells)
    });

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend(columns.iter().map(|_| Constraint::Length(app.col_width as u16)));

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(GRID_COLUMN_SPACING)
        .flex(Flex::Start)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(table, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else if app.is_editing() {
        "Enter/Tab commit · Esc cancel".to_string()
    } else {
        "Arrows move · Enter/click edit · Del clear · q quit".to_string()
    };
    let style = Style::default().fg(Color::Black).bg(Color::Gray);
    f.render_widget(Paragraph::new(text).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_core::Sheet;

    fn app(col_width: usize, visible_cols: usize) -> App {
        let mut app = App::new(Sheet::new(), col_width);
        app.visible_cols = visible_cols;
        app
    }

    #[test]
    fn test_columns_that_fit() {
        // 2 borders + 3 header = 5; 10 + 1 spacing per column
        assert_eq!(columns_that_fit(5 + 33, 10), 3);
        assert_eq!(columns_that_fit(2, 10), 1);
        assert_eq!(columns_that_fit(u16::MAX, 4), GRID_COLS);
    }

    #[test]
    fn test_grid_cell_at_maps_data_cells() {
        let app = app(10, 3);
        let area = Rect::new(0, 3, 60, GRID_HEIGHT);
        // inner starts at x=1, y=4; header row y=4; data row 0 at y=5
        // first column starts at x = 1 + 3 + 1 = 5
        assert_eq!(grid_cell_at(&app, area, 5, 5), Some(CellRef::new(0, 0)));
        assert_eq!(grid_cell_at(&app, area, 14, 5), Some(CellRef::new(0, 0)));
        assert_eq!(grid_cell_at(&app, area, 15, 5), None); // spacing
        assert_eq!(grid_cell_at(&app, area, 16, 14), Some(CellRef::new(1, 9)));
    }

    #[test]
    fn test_grid_cell_at_rejects_headers_and_outside() {
        let app = app(10, 3);
        let area = Rect::new(0, 3, 60, GRID_HEIGHT);
        assert_eq!(grid_cell_at(&app, area, 6, 4), None); // column header
        assert_eq!(grid_cell_at(&app, area, 2, 6), None); // row header
        assert_eq!(grid_cell_at(&app, area, 6, 0), None); // formula bar
        assert_eq!(grid_cell_at(&app, area, 50, 6), None); // past last visible column
    }

    #[test]
    fn test_grid_cell_at_respects_viewport() {
        let mut app = app(10, 3);
        app.viewport_col = 20;
        let area = Rect::new(0, 3, 60, GRID_HEIGHT);
        assert_eq!(grid_cell_at(&app, area, 5, 5), Some(CellRef::new(20, 0)));
    }
}

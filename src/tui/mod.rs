//! Terminal UI: the grid view over a [`Sheet`](cellgrid_core::Sheet).

mod app;
mod input;
mod ui;

pub use app::App;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use std::io::{self, Write};

/// Take over the terminal and run until the user quits.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();
    tracing::debug!("terminal ui started");

    let result = with_mouse_capture(&mut io::stdout(), || input::run_app(&mut terminal, app));

    ratatui::restore();
    tracing::debug!("terminal ui stopped");
    Ok(result?)
}

/// Run `body` with mouse reporting enabled on `out`. Capture is turned off
/// again whenever it was turned on, even if `body` fails.
fn with_mouse_capture<W: Write>(
    out: &mut W,
    body: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    execute!(out, EnableMouseCapture)?;
    let result = body();
    if let Err(e) = execute!(out, DisableMouseCapture) {
        tracing::warn!(error = %e, "failed to disable mouse capture");
    }
    result
}

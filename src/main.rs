//! cellgrid - a fixed 26x10 reactive spreadsheet in the terminal

mod cli;
mod config;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use anyhow::{Context, Result};
use cellgrid_core::export::{to_markdown, write_markdown};
use cellgrid_core::{CellgridError, Sheet};
use cellgrid_engine::engine::format_dynamic;
use std::process::ExitCode;

use cli::Options;
use config::Config;

fn main() -> ExitCode {
    let options = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            cli::print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(options) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: Options) -> Result<ExitCode> {
    let config = Config::load(options.config.as_deref())?;
    logging::init(&config, !options.is_batch())?;
    tracing::debug!(?config, "configuration loaded");

    let mut sheet = Sheet::new();
    for (cell, input) in &options.sets {
        sheet
            .set_cell(cell, input)
            .with_context(|| format!("setting {}", cell))?;
    }

    if !options.is_batch() {
        return run_interactive(sheet, &config);
    }

    if let Some(path) = &options.output {
        write_markdown(path, &sheet).with_context(|| format!("writing {}", path.display()))?;
        println!("Exported to {}", path.display());
    }
    if options.print {
        print!("{}", to_markdown(&sheet));
    }
    if let Some(formula) = &options.command {
        return Ok(run_command(&sheet, formula));
    }
    Ok(ExitCode::SUCCESS)
}

/// Evaluate one formula and print its display value.
fn run_command(sheet: &Sheet, formula: &str) -> ExitCode {
    match sheet.eval_expression(formula) {
        Ok(value) => {
            println!("{}", format_dynamic(&value));
            ExitCode::SUCCESS
        }
        Err(CellgridError::Rhai(err)) => {
            println!("{}", cellgrid_core::sheet::ERROR_DISPLAY);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "tui")]
fn run_interactive(sheet: Sheet, config: &Config) -> Result<ExitCode> {
    let mut app = tui::App::new(sheet, config.col_width);
    tui::run(&mut app)?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_sheet: Sheet, _config: &Config) -> Result<ExitCode> {
    anyhow::bail!("built without the `tui` feature; use --command, --print or --output")
}

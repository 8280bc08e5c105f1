//! Tracing subscriber setup.

use anyhow::{Context, Result, anyhow};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Environment variable overriding the configured log filter.
pub const LOG_ENV: &str = "CELLGRID_LOG";

/// Install the global subscriber.
///
/// The TUI owns the terminal, so interactive sessions log only to the
/// configured file. Non-interactive runs fall back to stderr.
pub fn init(config: &Config, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None if interactive => builder.with_writer(std::io::sink).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install logger: {e}"))
}

//! User configuration (`config.toml`).
//!
//! Looked up in the platform config directory unless a path is given on the
//! command line. A missing default file means defaults; a missing explicit
//! file or a malformed one is an error.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MIN_COL_WIDTH: usize = 4;
const MAX_COL_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Display width of each grid column.
    pub col_width: usize,
    /// Default log filter when `CELLGRID_LOG` is unset.
    pub log_level: String,
    /// Where to write logs. Without it the TUI does not log.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            col_width: 10,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load from `explicit`, or from the default location if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Config::default()),
            },
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(text)?;
        config.col_width = config.col_width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        Ok(config)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    Some(proj.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_values_and_clamp() {
        let config = Config::parse("col_width = 200\nlog_level = \"debug\"\nlog_file = \"/tmp/cg.log\"\n")
            .unwrap();
        assert_eq!(config.col_width, MAX_COL_WIDTH);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/cg.log")));
        assert_eq!(Config::parse("col_width = 1").unwrap().col_width, MIN_COL_WIDTH);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(Config::parse("colour = \"red\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "col_width = 12").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.col_width, 12);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("reading config"));
    }
}

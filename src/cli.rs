//! Command-line argument parsing.

use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// `(cell, input)` pairs applied in order before anything else.
    pub sets: Vec<(String, String)>,
    pub command: Option<String>,
    pub print: bool,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl Options {
    /// Whether the run finishes without starting the TUI.
    pub fn is_batch(&self) -> bool {
        self.command.is_some() || self.print || self.output.is_some()
    }
}

pub fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <CELL=INPUT>    Set a cell before starting (can be repeated)");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and exit");
    eprintln!("  -p, --print               Print the sheet as a markdown table and exit");
    eprintln!("  -o, --output <FILE>       Export the sheet to a markdown file and exit");
    eprintln!("      --config <FILE>       Load settings from this config file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Cells are A0 through Z9. Formulas start with '=' and may use:");
    for builtin in cellgrid_engine::builtins::RANGE_BUILTINS {
        eprintln!("  {:<24}{}", format!("{}(A0:B3)", builtin.sheet_name), builtin.description);
    }
    eprintln!("  {:<24}Typed value of a cell (text stays text)", "@A0");
    eprintln!("  {:<24}Scalar helpers", "ROUND ABS IF CONCAT");
    eprintln!();
    eprintln!("Logging is controlled by the CELLGRID_LOG environment variable.");
}

/// Parse arguments (without the program name). `Ok(None)` means help was
/// requested.
pub fn parse_args<I>(args: I) -> Result<Option<Options>>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-s" | "--set" => {
                let Some(value) = args.next() else {
                    bail!("--set requires CELL=INPUT");
                };
                let Some((cell, input)) = value.split_once('=') else {
                    bail!("--set expects CELL=INPUT, got '{}'", value);
                };
                options.sets.push((cell.trim().to_string(), input.to_string()));
            }
            "-c" | "--command" => {
                let Some(value) = args.next() else {
                    bail!("--command requires a formula");
                };
                options.command = Some(value);
            }
            "-p" | "--print" => options.print = true,
            "-o" | "--output" => {
                let Some(value) = args.next() else {
                    bail!("--output requires a file path");
                };
                options.output = Some(PathBuf::from(value));
            }
            "--config" => {
                let Some(value) = args.next() else {
                    bail!("--config requires a file path");
                };
                options.config = Some(PathBuf::from(value));
            }
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            other => bail!("Unexpected argument: {}", other),
        }
    }

    Ok(Some(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Options>> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_sets_keep_formula_equals() {
        let options = parse(&["-s", "A0=5", "--set", "B0==A0*2"]).unwrap().unwrap();
        assert_eq!(
            options.sets,
            vec![
                ("A0".to_string(), "5".to_string()),
                ("B0".to_string(), "=A0*2".to_string()),
            ]
        );
        assert!(!options.is_batch());
    }

    #[test]
    fn test_parse_batch_modes() {
        let options = parse(&["-c", "1+1", "-p", "-o", "out.md", "--config", "c.toml"])
            .unwrap()
            .unwrap();
        assert_eq!(options.command.as_deref(), Some("1+1"));
        assert!(options.print);
        assert_eq!(options.output, Some(PathBuf::from("out.md")));
        assert_eq!(options.config, Some(PathBuf::from("c.toml")));
        assert!(options.is_batch());
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(parse(&["-p", "--help"]).unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--set"]).is_err());
        assert!(parse(&["--set", "A0"]).is_err());
        assert!(parse(&["-c"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["file.grd"]).is_err());
    }
}

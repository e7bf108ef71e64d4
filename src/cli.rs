//! CLI command implementations for Wargrid.

pub(crate) mod forecast;
pub(crate) mod reach;
pub(crate) mod route;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;
use wargrid::board::unit::UnitHandle;
use wargrid::{BoardError, Grid, LoadError, Point, Rules, Scenario};

/// Output format shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text with an ANSI board.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<BoardError> for CliError {
    fn from(e: BoardError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Parse `X,Y` into a board point.
pub(crate) fn parse_point(text: &str) -> Result<Point, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{text}'"))?;
    let coord = |part: &str| {
        part.trim()
            .parse::<i16>()
            .map_err(|e| format!("bad coordinate '{part}': {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}

/// Rules from `path`, or the defaults.
pub(crate) fn load_rules(path: Option<&Path>) -> Result<Rules, CliError> {
    match path {
        Some(path) => Rules::from_json_file(path)
            .map_err(|e| CliError::new(format!("Failed to load rules {}: {e}", path.display()))),
        None => Ok(Rules::default()),
    }
}

/// Load a scenario file with the path in any error message.
pub(crate) fn load_scenario(path: &Path) -> Result<Scenario, CliError> {
    Scenario::load(path).map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))
}

/// Handle of the unit standing at `point`.
pub(crate) fn unit_handle(grid: &Grid, point: Point) -> Result<UnitHandle, CliError> {
    grid.handle_at(point)
        .ok_or_else(|| CliError::new(format!("No unit at {point}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("3,4"), Ok(Point::new(3, 4)));
        assert_eq!(parse_point(" 0 , 12"), Ok(Point::new(0, 12)));
        assert!(parse_point("3").is_err());
        assert!(parse_point("a,1").is_err());
    }
}

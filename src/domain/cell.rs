//! Cell entity and its captured result.

use crate::error::PlanError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn cell_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("cell name pattern is a valid regex")
    })
}

/// Name of a cell. Doubles as the output file stem, so it is restricted to
/// lowercase letters, digits, `.`, `_` and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellName(String);

impl CellName {
    /// Parse a CellName from a string
    pub fn parse(s: &str) -> Result<Self, PlanError> {
        if cell_name_pattern().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(PlanError::InvalidCellName(s.to_string()))
        }
    }

    /// Name of the file the cell's output is captured into
    pub fn output_filename(&self) -> String {
        format!("{}.txt", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CellName {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CellName> for String {
    fn from(name: CellName) -> Self {
        name.0
    }
}

impl std::fmt::Display for CellName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CellName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named unit of shell work, executed exactly once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub name: CellName,
    /// Shell command sequence, run with `<shell> -c`
    pub script: String,
}

impl Cell {
    pub fn new(name: CellName, script: impl Into<String>) -> Self {
        Self {
            name,
            script: script.into(),
        }
    }
}

/// Outcome of running one cell.
///
/// A failing command is still a captured cell: the status is kept here so
/// the caller decides what to do with it.
#[derive(Debug, Clone)]
pub struct CellResult {
    pub name: CellName,
    /// Exit code, `None` if the command never started or died from a signal
    pub status: Option<i32>,
    /// Merged stdout/stderr, verbatim
    pub output: Vec<u8>,
    /// Where the output was written
    pub path: PathBuf,
    /// Set when the output file itself could not be written
    pub write_error: Option<String>,
}

impl CellResult {
    /// Check if the command exited with status 0
    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }

    /// Check if the output made it to disk
    pub fn is_captured(&self) -> bool {
        self.write_error.is_none()
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Get status indicator for logs
    pub fn indicator(&self) -> &'static str {
        match self.status {
            Some(0) => "✓",
            Some(_) => "✗",
            None => "!",
        }
    }
}

//! Tutorial parts and their labels.

use super::Cell;
use crate::error::PlanError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+)-([a-z0-9][a-z0-9-]*)$").expect("part label pattern is a valid regex")
    })
}

/// Label of a part.
/// Format: "{NN}-{slug}" (e.g., "02-first-pattern")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartLabel {
    label: String,
    number: u32,
}

impl PartLabel {
    /// Create a new PartLabel from number and slug
    pub fn new(number: u32, slug: &str) -> Result<Self, PlanError> {
        Self::parse(&format!("{:02}-{}", number, slug))
    }

    /// Parse a PartLabel from a string
    pub fn parse(s: &str) -> Result<Self, PlanError> {
        let caps = label_pattern()
            .captures(s)
            .ok_or_else(|| PlanError::InvalidLabel(s.to_string()))?;
        let number = caps[1]
            .parse()
            .map_err(|_| PlanError::InvalidLabel(s.to_string()))?;

        Ok(Self {
            label: s.to_string(),
            number,
        })
    }

    /// Get the numeric portion of the label
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Get the slug portion of the label
    pub fn slug(&self) -> &str {
        self.label
            .split_once('-')
            .map(|(_, slug)| slug)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }
}

impl TryFrom<String> for PartLabel {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PartLabel> for String {
    fn from(label: PartLabel) -> Self {
        label.label
    }
}

impl std::fmt::Display for PartLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A stage of the tutorial: its cells run in order, then a snapshot is taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub label: PartLabel,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Part {
    pub fn new(label: PartLabel, title: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            label,
            title: title.into(),
            cells,
        }
    }

    /// Get display name for the part
    pub fn display_name(&self) -> String {
        if self.title.is_empty() {
            self.label.to_string()
        } else {
            format!("{} ({})", self.label, self.title)
        }
    }
}

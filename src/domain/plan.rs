//! The ordered list of parts a pipeline run walks through.

use super::{Cell, Part};
use crate::error::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

/// Built-in delivery-process tutorial
const BUILTIN_PLAN: &str = include_str!("../../default_plan.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorialPlan {
    pub parts: Vec<Part>,
}

impl TutorialPlan {
    /// Build a plan from parts, validating ordering and uniqueness
    pub fn new(parts: Vec<Part>) -> PlanResult<Self> {
        let plan = Self { parts };
        plan.validate()?;
        Ok(plan)
    }

    /// The tutorial shipped with the binary
    pub fn builtin() -> PlanResult<Self> {
        Self::from_toml_str(BUILTIN_PLAN)
    }

    /// Parse a plan from TOML text
    pub fn from_toml_str(text: &str) -> PlanResult<Self> {
        let plan: Self = toml::from_str(text)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load a plan from a TOML file
    pub fn load(path: &Path) -> PlanResult<Self> {
        if !path.exists() {
            return Err(PlanError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parts must be strictly increasing by number; labels and cell names
    /// must be unique across the plan.
    pub fn validate(&self) -> PlanResult<()> {
        let mut labels = HashSet::new();
        let mut cells = HashSet::new();
        let mut previous: Option<u32> = None;

        for part in &self.parts {
            if !labels.insert(part.label.as_str()) {
                return Err(PlanError::DuplicatePart(part.label.to_string()));
            }
            if let Some(prev) = previous {
                if part.label.number() <= prev {
                    return Err(PlanError::OutOfOrder {
                        label: part.label.to_string(),
                        previous: prev,
                    });
                }
            }
            previous = Some(part.label.number());

            if part.cells.is_empty() {
                return Err(PlanError::EmptyPart(part.label.to_string()));
            }
            for cell in &part.cells {
                if !cells.insert(cell.name.as_str()) {
                    return Err(PlanError::DuplicateCell(cell.name.to_string()));
                }
            }
        }

        Ok(())
    }

    /// All cells in execution order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.parts.iter().flat_map(|part| part.cells.iter())
    }

    pub fn cell_count(&self) -> usize {
        self.parts.iter().map(|part| part.cells.len()).sum()
    }

    /// Human-readable outline of the plan
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            let _ = writeln!(out, "{}", part.display_name());
            for cell in &part.cells {
                let _ = writeln!(out, "  - {}", cell.name);
            }
        }
        out
    }
}

//! Environment record captured once per run.

use serde::Serialize;

/// Recorded when a tool or the dependency cannot be resolved
pub const NOT_INSTALLED: &str = "not installed";

/// Flat, ordered key/value record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentRecord {
    entries: Vec<(String, String)>,
}

impl EnvironmentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `key: value` lines
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}: {}\n", k, v))
            .collect()
    }
}

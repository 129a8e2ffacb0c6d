//! Shared fixtures for integration tests.
//!
//! `FakeDeliveryProcess` answers the external package's entry points
//! (`npm install`, `npx process-api`, `npx generate-docs`) without the package
//! being installed, and hands every other script to the real shell.

#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tutorial_snapshot::domain::{TutorialPlan, Workspace};
use tutorial_snapshot::services::{CommandExecutor, CommandOutcome, ShellExecutor};
use tutorial_snapshot::PipelineConfig;

#[derive(Default)]
pub struct FakeDeliveryProcess {
    shell: ShellExecutor,
    pub invocations: Mutex<Vec<String>>,
}

impl FakeDeliveryProcess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for FakeDeliveryProcess {
    async fn execute(&self, script: &str, working_dir: &Path) -> CommandOutcome {
        let command = script.trim();
        self.invocations.lock().unwrap().push(command.to_string());

        if command.starts_with("npm install") {
            return CommandOutcome::new(Some(0), "added 1 package\n");
        }
        if command.starts_with("npx process-api") {
            let patterns = scan_patterns(&working_dir.join("src"));
            let output = if command.ends_with("overview") {
                format!("{} patterns\n", patterns.len())
            } else {
                format!("query: {}\n{}\n", command, patterns.join("\n"))
            };
            return CommandOutcome::new(Some(0), output);
        }
        if command.starts_with("npx generate-docs") {
            let patterns = scan_patterns(&working_dir.join("src"));
            let docs = working_dir.join("docs-generated");
            fs::create_dir_all(&docs).unwrap();
            let body: String = patterns.iter().map(|p| format!("- {}\n", p)).collect();
            fs::write(docs.join("PATTERNS.md"), format!("# Patterns\n\n{}", body)).unwrap();
            return CommandOutcome::new(Some(0), "Generated 1 file\n");
        }

        self.shell.execute(script, working_dir).await
    }
}

/// Pattern names from opted-in files under `dir`, sorted
pub fn scan_patterns(dir: &Path) -> Vec<String> {
    let mut patterns = Vec::new();
    collect_patterns(dir, &mut patterns);
    patterns.sort();
    patterns
}

fn collect_patterns(dir: &Path, patterns: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_patterns(&path, patterns);
            continue;
        }
        let Ok(text) = fs::read_to_string(&path) else {
            continue;
        };
        if !text.lines().any(|l| l.trim_start_matches([' ', '*', '/']).trim() == "@libar-docs") {
            continue;
        }
        for line in text.lines() {
            if let Some((_, name)) = line.split_once("@libar-docs-pattern ") {
                patterns.push(name.trim().to_string());
            }
        }
    }
}

pub fn workspace(temp: &TempDir) -> Workspace {
    Workspace::new(temp.path().to_path_buf(), PipelineConfig::default())
}

pub fn builtin_plan() -> TutorialPlan {
    TutorialPlan::builtin().unwrap()
}

pub fn read(path: impl Into<PathBuf>) -> String {
    fs::read_to_string(path.into()).unwrap()
}

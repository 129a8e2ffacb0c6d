//! Environment recorder: tool versions, platform and dependency version.

use super::executor::CommandExecutor;
use crate::config::EnvironmentConfig;
use crate::domain::{EnvironmentRecord, Workspace, NOT_INSTALLED};
use crate::error::{CaptureError, CaptureResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub struct EnvironmentRecorder {
    executor: Arc<dyn CommandExecutor>,
    tools: Vec<String>,
    dependency: String,
}

impl EnvironmentRecorder {
    pub fn new(executor: Arc<dyn CommandExecutor>, tools: Vec<String>, dependency: String) -> Self {
        Self {
            executor,
            tools,
            dependency,
        }
    }

    pub fn from_config(executor: Arc<dyn CommandExecutor>, config: &EnvironmentConfig) -> Self {
        Self::new(executor, config.tools.clone(), config.dependency.clone())
    }

    /// Collect the record. Missing tools and a missing dependency are
    /// recorded as [`NOT_INSTALLED`].
    pub async fn collect(&self, workspace: &Workspace) -> EnvironmentRecord {
        let mut record = EnvironmentRecord::new();
        record.insert("date", chrono::Utc::now().format("%Y-%m-%d").to_string());
        record.insert("os", std::env::consts::OS);
        record.insert("arch", std::env::consts::ARCH);

        let release = self.executor.execute("uname -r", &workspace.root_path).await;
        let release = match (release.success(), release.first_line()) {
            (true, Some(line)) => line,
            _ => "unknown".to_string(),
        };
        record.insert("os_release", release);

        for tool in &self.tools {
            let version = self.tool_version(tool, &workspace.root_path).await;
            record.insert(tool.as_str(), version);
        }

        record.insert(
            self.dependency.as_str(),
            dependency_version(&workspace.root_path, &self.dependency)
                .unwrap_or_else(|| NOT_INSTALLED.to_string()),
        );

        record
    }

    /// Collect and write `environment.txt`
    pub async fn record(&self, workspace: &Workspace) -> CaptureResult<EnvironmentRecord> {
        let record = self.collect(workspace).await;
        write_record(workspace, &record)?;
        Ok(record)
    }

    async fn tool_version(&self, tool: &str, working_dir: &Path) -> String {
        if which::which(tool).is_err() {
            tracing::debug!("{} not found on PATH", tool);
            return NOT_INSTALLED.to_string();
        }

        let outcome = self
            .executor
            .execute(&format!("{} --version", tool), working_dir)
            .await;
        match (outcome.success(), outcome.first_line()) {
            (true, Some(line)) => line,
            _ => NOT_INSTALLED.to_string(),
        }
    }
}

/// Installed version of a package, read from its manifest under node_modules
pub fn dependency_version(root: &Path, package: &str) -> Option<String> {
    let manifest = root.join("node_modules").join(package).join("package.json");
    let text = fs::read_to_string(manifest).ok()?;
    let value: serde_json::Value = serde_json::from_str(&text).ok()?;
    value
        .get("version")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn write_record(workspace: &Workspace, record: &EnvironmentRecord) -> CaptureResult<()> {
    let path = workspace.environment_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CaptureError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, record.render()).map_err(|source| CaptureError::Write { path, source })
}

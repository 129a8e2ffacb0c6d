//! Pipeline orchestration: reset, record, then run each part and snapshot it.

use crate::config::PipelineConfig;
use crate::domain::{
    CellResult, EnvironmentRecord, Part, PartLabel, Snapshot, TutorialPlan, Workspace,
};
use crate::error::Result;
use crate::services::{
    CommandExecutor, EnvironmentRecorder, ResetReport, ShellExecutor, SnapshotCapturer, StepRunner,
    WorkspaceReset,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Counts printed at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub parts: usize,
    pub cells_captured: usize,
    pub snapshots_taken: usize,
    pub environment_recorded: bool,
}

impl RunSummary {
    /// One-line console summary. Does not distinguish failed cells; their
    /// output files are the place to look.
    pub fn render(&self) -> String {
        format!(
            "Ran {} parts: captured {} cell outputs and {} snapshots",
            self.parts, self.cells_captured, self.snapshots_taken
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub reset: ResetReport,
    /// Parts attempted
    pub parts: usize,
    pub environment: Option<EnvironmentRecord>,
    pub cells: Vec<CellResult>,
    pub snapshots: Vec<Snapshot>,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            parts: self.parts,
            cells_captured: self.cells.iter().filter(|c| c.is_captured()).count(),
            snapshots_taken: self.snapshots.len(),
            environment_recorded: self.environment.is_some(),
        }
    }

    /// Look up a cell's result by name
    pub fn cell(&self, name: &str) -> Option<&CellResult> {
        self.cells.iter().find(|c| c.name.as_str() == name)
    }
}

/// Runs a tutorial plan against a workspace, strictly in order
pub struct Pipeline {
    workspace: Workspace,
    plan: TutorialPlan,
    reset: WorkspaceReset,
    steps: StepRunner,
    snapshots: SnapshotCapturer,
    environment: EnvironmentRecorder,
}

impl Pipeline {
    /// Create a pipeline around any command executor
    pub fn new(workspace: Workspace, plan: TutorialPlan, executor: Arc<dyn CommandExecutor>) -> Self {
        let reset = WorkspaceReset::from_workspace(&workspace);
        let snapshots = SnapshotCapturer::from_config(&workspace.config.snapshot);
        let environment =
            EnvironmentRecorder::from_config(executor.clone(), &workspace.config.environment);

        Self {
            workspace,
            plan,
            reset,
            steps: StepRunner::new(executor),
            snapshots,
            environment,
        }
    }

    /// Create a pipeline that runs cells with the configured shell
    pub fn with_shell(workspace: Workspace, plan: TutorialPlan) -> Self {
        let executor = ShellExecutor::new(&workspace.config.shell.program);
        Self::new(workspace, plan, Arc::new(executor))
    }

    /// Load configuration and plan for a workspace root and build a shell
    /// pipeline. Without `config_path` the layered lookup is used; without
    /// `plan_path` the built-in tutorial.
    pub fn load(root: PathBuf, config_path: Option<&Path>, plan_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => PipelineConfig::load_file(path)?,
            None => PipelineConfig::load(Some(&root))?,
        };
        let plan = match plan_path {
            Some(path) => TutorialPlan::load(path)?,
            None => TutorialPlan::builtin()?,
        };

        Ok(Self::with_shell(Workspace::new(root, config), plan))
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn plan(&self) -> &TutorialPlan {
        &self.plan
    }

    /// Restore the clean starting state
    pub fn reset(&self, include_output: bool) -> Result<ResetReport> {
        Ok(self.reset.reset(&self.workspace, include_output)?)
    }

    /// Record tool and dependency versions to `environment.txt`
    pub async fn record_environment(&self) -> Result<EnvironmentRecord> {
        Ok(self.environment.record(&self.workspace).await?)
    }

    /// Take the snapshot for a part
    pub fn snapshot(&self, label: &PartLabel) -> Result<Snapshot> {
        Ok(self.snapshots.capture(&self.workspace, label)?)
    }

    /// Run one part's cells, then snapshot it. Cell status is not
    /// inspected; failures live in the captured output.
    pub async fn run_part(&self, part: &Part, report: &mut RunReport) {
        tracing::info!("Part {}", part.display_name());

        report.parts += 1;
        for cell in &part.cells {
            let result = self.steps.run(&self.workspace, cell).await;
            report.cells.push(result);
        }

        match self.snapshot(&part.label) {
            Ok(snapshot) => report.snapshots.push(snapshot),
            Err(e) => tracing::error!("Snapshot {} failed: {}", part.label, e),
        }
    }

    /// Run the whole plan. Only a failed reset aborts the run.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport {
            reset: self.reset(false)?,
            ..RunReport::default()
        };

        if let Err(e) = self.workspace.ensure_output_directories() {
            tracing::warn!("Failed to create output directories: {}", e);
        }

        match self.record_environment().await {
            Ok(record) => report.environment = Some(record),
            Err(e) => tracing::error!("Failed to record environment: {}", e),
        }

        for part in &self.plan.parts {
            self.run_part(part, &mut report).await;
        }

        let summary = report.summary();
        tracing::info!("{}", summary.render());
        Ok(report)
    }
}

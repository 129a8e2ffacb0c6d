//! Step runner: executes one cell and captures its output to disk.

use super::executor::CommandExecutor;
use crate::domain::{Cell, CellResult, Workspace};
use crate::error::{CaptureError, CaptureResult};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Runs cells and writes `<cell-name>.txt`
pub struct StepRunner {
    executor: Arc<dyn CommandExecutor>,
}

impl StepRunner {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Run a cell in the workspace root.
    ///
    /// Returns normally whatever the command does; a non-zero exit or a
    /// failed start is recorded in the result and in the captured text.
    pub async fn run(&self, workspace: &Workspace, cell: &Cell) -> CellResult {
        tracing::debug!("Running cell {}", cell.name);

        let outcome = self
            .executor
            .execute(&cell.script, &workspace.root_path)
            .await;
        let path = workspace.cell_output_path(&cell.name);

        let write_error = match write_output(&workspace.cells_directory, &path, &outcome.output) {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("Failed to capture output of {}: {}", cell.name, e);
                Some(e.to_string())
            }
        };

        let result = CellResult {
            name: cell.name.clone(),
            status: outcome.status,
            output: outcome.output,
            path,
            write_error,
        };

        match result.status {
            Some(0) => tracing::info!("{} {}", result.indicator(), cell.name),
            Some(code) => tracing::warn!("{} {} exited with {}", result.indicator(), cell.name, code),
            None => tracing::warn!("{} {} did not exit normally", result.indicator(), cell.name),
        }

        result
    }
}

/// Write (truncating) a captured output file
fn write_output(directory: &Path, path: &Path, output: &[u8]) -> CaptureResult<()> {
    fs::create_dir_all(directory).map_err(|source| CaptureError::OutputDir {
        path: directory.to_path_buf(),
        source,
    })?;
    fs::write(path, output).map_err(|source| CaptureError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::domain::CellName;
    use crate::services::executor::ShellExecutor;
    use tempfile::TempDir;

    fn runner() -> StepRunner {
        StepRunner::new(Arc::new(ShellExecutor::default()))
    }

    fn cell(name: &str, script: &str) -> Cell {
        Cell::new(CellName::parse(name).unwrap(), script)
    }

    #[tokio::test]
    async fn test_captures_output_to_named_file() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path().to_path_buf(), PipelineConfig::default());

        let result = runner()
            .run(&workspace, &cell("hello", "echo hello; echo warn >&2"))
            .await;

        assert!(result.succeeded());
        assert!(result.is_captured());
        assert_eq!(result.path, temp.path().join("output/cells/hello.txt"));
        assert_eq!(fs::read_to_string(&result.path).unwrap(), "hello\nwarn\n");
    }

    #[tokio::test]
    async fn test_failure_is_captured_not_propagated() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path().to_path_buf(), PipelineConfig::default());

        let result = runner()
            .run(&workspace, &cell("broken", "no-such-command-xyz"))
            .await;

        assert!(!result.succeeded());
        assert!(result.is_captured());
        let text = fs::read_to_string(&result.path).unwrap();
        assert!(text.contains("no-such-command-xyz"));
    }

    #[tokio::test]
    async fn test_rerun_overwrites() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path().to_path_buf(), PipelineConfig::default());
        let runner = runner();

        runner
            .run(&workspace, &cell("step", "echo first-run-with-longer-text"))
            .await;
        let result = runner.run(&workspace, &cell("step", "echo second")).await;

        assert_eq!(fs::read_to_string(&result.path).unwrap(), "second\n");
    }

    #[tokio::test]
    async fn test_cells_share_workspace_state() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path().to_path_buf(), PipelineConfig::default());
        let runner = runner();

        runner
            .run(&workspace, &cell("write", "mkdir -p src && echo data > src/a.txt"))
            .await;
        let result = runner.run(&workspace, &cell("read", "cat src/a.txt")).await;

        assert_eq!(result.output_text(), "data\n");
    }

    #[tokio::test]
    async fn test_unwritable_output_is_recorded() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::new(temp.path().to_path_buf(), PipelineConfig::default());
        // A file where the output directory should be
        fs::create_dir_all(temp.path().join("output")).unwrap();
        fs::write(temp.path().join("output/cells"), "not a directory").unwrap();

        let result = runner().run(&workspace, &cell("step", "echo hi")).await;

        assert!(result.succeeded());
        assert!(!result.is_captured());
        assert_eq!(result.output_text(), "hi\n");
    }
}

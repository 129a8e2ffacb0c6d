//! Command execution behind a narrow interface.
//!
//! Scripts go in, merged output and an exit status come out. The pipeline
//! only ever talks to [`CommandExecutor`], so tests can swap in a fake for
//! the external documentation package.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Merged output and exit status of one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the command never started or died from a signal
    pub status: Option<i32>,
    /// stdout and stderr in the order they were written
    pub output: Vec<u8>,
}

impl CommandOutcome {
    pub fn new(status: Option<i32>, output: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    /// Outcome for a command that could not be started
    pub fn not_started(message: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            output: format!("{}\n", message).into_bytes(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// First non-empty output line, trimmed
    pub fn first_line(&self) -> Option<String> {
        String::from_utf8_lossy(&self.output)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }
}

/// Runs a shell script in a working directory. Never fails: start errors are
/// reported through the outcome.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, script: &str, working_dir: &Path) -> CommandOutcome;
}

/// Executes scripts with `<shell> -c`
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    program: PathBuf,
}

impl ShellExecutor {
    /// Create a shell executor, resolving the program on PATH when possible
    pub fn new(program: &str) -> Self {
        let program = which::which(program).unwrap_or_else(|_| PathBuf::from(program));
        Self { program }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("sh")
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, script: &str, working_dir: &Path) -> CommandOutcome {
        // Send stderr into stdout inside the shell so interleaving is kept.
        let merged = format!("exec 2>&1\n{}", script);

        let result = Command::new(&self.program)
            .arg("-c")
            .arg(&merged)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let mut combined = output.stdout;
                combined.extend_from_slice(&output.stderr);
                CommandOutcome::new(output.status.code(), combined)
            }
            Err(e) => {
                tracing::warn!("Failed to start {}: {}", self.program.display(), e);
                CommandOutcome::not_started(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_merges_stdout_and_stderr_in_order() {
        let temp = TempDir::new().unwrap();
        let executor = ShellExecutor::default();

        let outcome = executor
            .execute("echo one; echo two >&2; echo three", temp.path())
            .await;

        assert!(outcome.success());
        assert_eq!(String::from_utf8_lossy(&outcome.output), "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let temp = TempDir::new().unwrap();
        let executor = ShellExecutor::default();

        let outcome = executor.execute("echo boom >&2; exit 3", temp.path()).await;

        assert_eq!(outcome.status, Some(3));
        assert_eq!(String::from_utf8_lossy(&outcome.output), "boom\n");
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "here").unwrap();
        let executor = ShellExecutor::default();

        let outcome = executor.execute("cat marker.txt", temp.path()).await;

        assert_eq!(String::from_utf8_lossy(&outcome.output), "here");
    }

    #[tokio::test]
    async fn test_dropped_execution_kills_the_child() {
        let temp = TempDir::new().unwrap();
        let executor = ShellExecutor::default();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            executor.execute("sleep 0.3; touch late.txt", temp.path()),
        )
        .await;
        assert!(result.is_err());

        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
        assert!(!temp.path().join("late.txt").exists());
    }

    #[test]
    fn test_missing_shell_reports_not_started() {
        let temp = TempDir::new().unwrap();
        let executor = ShellExecutor::new("/nonexistent/shell-xyz");

        let outcome = tokio_test::block_on(executor.execute("echo hi", temp.path()));

        assert_eq!(outcome.status, None);
        assert!(String::from_utf8_lossy(&outcome.output).contains("failed to start"));
    }

    #[test]
    fn test_first_line() {
        let outcome = CommandOutcome::new(Some(0), "\n  v20.11.0  \nextra\n");
        assert_eq!(outcome.first_line().as_deref(), Some("v20.11.0"));
        assert_eq!(CommandOutcome::new(Some(0), "").first_line(), None);
    }
}

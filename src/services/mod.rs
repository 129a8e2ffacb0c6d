//! Services that act on the workspace.
//!
//! This module contains:
//! - CommandExecutor / ShellExecutor: Script execution with merged output
//! - StepRunner: Runs a cell and captures its output file
//! - SnapshotCapturer: Per-part copies and the sorted file listing
//! - EnvironmentRecorder: Tool, platform and dependency versions
//! - WorkspaceReset: Restores the clean starting state

mod environment;
pub mod executor;
mod reset;
pub mod snapshot;
mod step;

pub use environment::{dependency_version, EnvironmentRecorder};
pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
pub use reset::{ResetReport, WorkspaceReset};
pub use snapshot::SnapshotCapturer;
pub use step::StepRunner;

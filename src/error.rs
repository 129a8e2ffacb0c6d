//! Unified error types for tutorial-snapshot.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Workspace reset failed: {0}")]
    Reset(#[from] ResetError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Tutorial plan errors
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid part label: {0}")]
    InvalidLabel(String),

    #[error("Invalid cell name: {0}")]
    InvalidCellName(String),

    #[error("Duplicate cell name: {0}")]
    DuplicateCell(String),

    #[error("Duplicate part label: {0}")]
    DuplicatePart(String),

    #[error("Part {label} is out of order (must come after part {previous})")]
    OutOfOrder { label: String, previous: u32 },

    #[error("Part {0} has no cells")]
    EmptyPart(String),

    #[error("Plan file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse plan: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error reading plan: {0}")]
    Io(#[from] std::io::Error),
}

/// Workspace reset errors. Always fatal for a run.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Snapshot capture errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to prepare snapshot directory {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list workspace files: {0}")]
    Listing(std::io::Error),

    #[error("Failed to write tree listing: {0}")]
    Tree(std::io::Error),
}

/// Output capture errors (cell output files, environment record)
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for plan operations
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Result type alias for capture operations
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

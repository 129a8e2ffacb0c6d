//! tutorial-snapshot: deterministic tutorial runner
//!
//! This crate runs a tutorial as an ordered list of parts, captures every
//! cell's merged output into `<cell-name>.txt`, and snapshots the workspace
//! after each part.

pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod services;

pub use config::PipelineConfig;
pub use error::{AppError, Result};
pub use pipeline::{Pipeline, RunReport, RunSummary};

//! Domain entities for tutorial-snapshot.
//!
//! This module contains the core entities:
//! - Cell: A named unit of shell work and its captured result
//! - Part: A labeled group of cells followed by a snapshot
//! - TutorialPlan: The ordered list of parts
//! - Workspace: The project directory shared by every step
//! - Snapshot / EnvironmentRecord: What a run leaves behind

mod cell;
mod environment;
mod part;
mod plan;
mod snapshot;
mod workspace;

pub use cell::{Cell, CellName, CellResult};
pub use environment::{EnvironmentRecord, NOT_INSTALLED};
pub use part::{Part, PartLabel};
pub use plan::TutorialPlan;
pub use snapshot::{render_tree, Snapshot, TREE_FILE};
pub use workspace::{Workspace, WORKSPACE_MARKER};

//! Workspace handle: the project directory every step reads and writes.

use super::{CellName, PartLabel};
use crate::config::PipelineConfig;
use std::path::{Path, PathBuf};

/// Marker file identifying a tutorial workspace root
pub const WORKSPACE_MARKER: &str = ".tutorial-snapshot.toml";

/// The shared working directory of a run, passed explicitly to each step.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Project root path
    pub root_path: PathBuf,
    /// Root of all captured output (absolute path)
    pub output_directory: PathBuf,
    /// Directory for `<cell-name>.txt` files (absolute path)
    pub cells_directory: PathBuf,
    /// Directory holding one subdirectory per part (absolute path)
    pub snapshots_directory: PathBuf,
    /// Loaded configuration
    pub config: PipelineConfig,
}

impl Workspace {
    /// Create a new Workspace from a root path and configuration
    pub fn new(root_path: PathBuf, config: PipelineConfig) -> Self {
        let output_directory = root_path.join(&config.output.directory);
        let cells_directory = output_directory.join(&config.output.cells);
        let snapshots_directory = output_directory.join(&config.output.snapshots);

        Self {
            root_path,
            output_directory,
            cells_directory,
            snapshots_directory,
            config,
        }
    }

    /// Discover the workspace root by walking up from a directory until the
    /// marker config file is found
    pub fn discover(start_path: Option<PathBuf>) -> Option<PathBuf> {
        let start = start_path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut current = start.as_path();
        loop {
            if current.join(WORKSPACE_MARKER).is_file() {
                return Some(current.to_path_buf());
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return None,
            }
        }
    }

    /// Resolve a workspace-relative path
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root_path.join(relative)
    }

    /// Path of a cell's captured output
    pub fn cell_output_path(&self, name: &CellName) -> PathBuf {
        self.cells_directory.join(name.output_filename())
    }

    /// Directory of a part's snapshot
    pub fn snapshot_directory(&self, label: &PartLabel) -> PathBuf {
        self.snapshots_directory.join(label.as_str())
    }

    /// Path of the environment record
    pub fn environment_path(&self) -> PathBuf {
        self.output_directory
            .join(&self.config.output.environment_file)
    }

    /// Path of the package manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.config.manifest.path)
    }

    /// Ensure the cells and snapshots directories exist
    pub fn ensure_output_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.cells_directory)?;
        std::fs::create_dir_all(&self.snapshots_directory)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_new() {
        let workspace = Workspace::new(PathBuf::from("/tmp/tutorial"), PipelineConfig::default());

        assert_eq!(workspace.root_path, PathBuf::from("/tmp/tutorial"));
        assert_eq!(
            workspace.cells_directory,
            PathBuf::from("/tmp/tutorial/output/cells")
        );
        assert_eq!(
            workspace.snapshots_directory,
            PathBuf::from("/tmp/tutorial/output/snapshots")
        );
        assert_eq!(
            workspace.environment_path(),
            PathBuf::from("/tmp/tutorial/output/environment.txt")
        );
        assert_eq!(
            workspace.manifest_path(),
            PathBuf::from("/tmp/tutorial/package.json")
        );
    }

    #[test]
    fn test_output_paths() {
        let workspace = Workspace::new(PathBuf::from("/tmp/tutorial"), PipelineConfig::default());
        let name = CellName::parse("query-overview").unwrap();
        let label = PartLabel::parse("02-first-pattern").unwrap();

        assert_eq!(
            workspace.cell_output_path(&name),
            PathBuf::from("/tmp/tutorial/output/cells/query-overview.txt")
        );
        assert_eq!(
            workspace.snapshot_directory(&label),
            PathBuf::from("/tmp/tutorial/output/snapshots/02-first-pattern")
        );
    }

    #[test]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(WORKSPACE_MARKER), "").unwrap();
        let nested = temp.path().join("src").join("sample");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            Workspace::discover(Some(nested)),
            Some(temp.path().to_path_buf())
        );
    }
}

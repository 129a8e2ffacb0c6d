//! Workspace reset: removes generated paths and rewrites a minimal manifest.

use crate::config::{Dependency, ManifestConfig};
use crate::domain::Workspace;
use crate::error::ResetError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a reset removed and rewrote
#[derive(Debug, Clone, Default)]
pub struct ResetReport {
    /// Paths that existed and were deleted
    pub removed: Vec<PathBuf>,
    /// The rewritten manifest
    pub manifest: PathBuf,
}

/// Minimal package manifest: declared dependencies only
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    name: &'a str,
    version: &'a str,
    private: bool,
    #[serde(rename = "type")]
    kind: &'a str,
    dependencies: BTreeMap<&'a str, &'a str>,
}

impl<'a> Manifest<'a> {
    fn from_config(config: &'a ManifestConfig) -> Self {
        Self {
            name: &config.name,
            version: &config.version,
            private: true,
            kind: "module",
            dependencies: config
                .dependencies
                .iter()
                .map(|Dependency { name, version }| (name.as_str(), version.as_str()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceReset {
    paths: Vec<PathBuf>,
    manifest: ManifestConfig,
}

impl WorkspaceReset {
    pub fn new(paths: Vec<PathBuf>, manifest: ManifestConfig) -> Self {
        Self { paths, manifest }
    }

    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self::new(
            workspace.config.reset.paths.clone(),
            workspace.config.manifest.clone(),
        )
    }

    /// Restore the clean starting state.
    ///
    /// With `include_output`, captured outputs and snapshots are removed too.
    /// Any failure here is fatal for a run.
    pub fn reset(
        &self,
        workspace: &Workspace,
        include_output: bool,
    ) -> Result<ResetReport, ResetError> {
        let mut report = ResetReport::default();

        let mut targets: Vec<PathBuf> = self.paths.iter().map(|p| workspace.resolve(p)).collect();
        if include_output {
            targets.push(workspace.output_directory.clone());
        }

        for target in targets {
            if remove_path(&target)? {
                tracing::debug!("Removed {}", target.display());
                report.removed.push(target);
            }
        }

        report.manifest = self.write_manifest(workspace)?;
        tracing::info!(
            "Workspace reset: removed {} paths, wrote {}",
            report.removed.len(),
            report.manifest.display()
        );
        Ok(report)
    }

    fn write_manifest(&self, workspace: &Workspace) -> Result<PathBuf, ResetError> {
        let path = workspace.manifest_path();
        let mut text = serde_json::to_string_pretty(&Manifest::from_config(&self.manifest))?;
        text.push('\n');

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ResetError::Manifest {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, text).map_err(|source| ResetError::Manifest {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Delete a file or directory tree. Returns false when it was already gone.
fn remove_path(path: &Path) -> Result<bool, ResetError> {
    let remove_err = |source| ResetError::Remove {
        path: path.to_path_buf(),
        source,
    };

    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(remove_err(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(remove_err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::TempDir;

    fn workspace(temp: &TempDir) -> Workspace {
        Workspace::new(temp.path().to_path_buf(), PipelineConfig::default())
    }

    #[test]
    fn test_reset_removes_generated_paths() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::create_dir_all(temp.path().join("src/sample")).unwrap();
        fs::write(temp.path().join("src/sample/foo.ts"), "").unwrap();
        fs::create_dir_all(temp.path().join("docs-generated")).unwrap();
        fs::write(temp.path().join("tsconfig.json"), "{}").unwrap();
        fs::create_dir_all(temp.path().join("output/snapshots/01-setup")).unwrap();

        let report = WorkspaceReset::from_workspace(&ws).reset(&ws, false).unwrap();

        assert!(!temp.path().join("src").exists());
        assert!(!temp.path().join("docs-generated").exists());
        assert!(!temp.path().join("tsconfig.json").exists());
        // Snapshots survive a plain reset
        assert!(temp.path().join("output/snapshots/01-setup").exists());
        assert_eq!(report.removed.len(), 3);
    }

    #[test]
    fn test_reset_all_removes_output() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::create_dir_all(temp.path().join("output/cells")).unwrap();

        WorkspaceReset::from_workspace(&ws).reset(&ws, true).unwrap();

        assert!(!temp.path().join("output").exists());
    }

    #[test]
    fn test_reset_on_empty_workspace() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);

        let report = WorkspaceReset::from_workspace(&ws).reset(&ws, false).unwrap();

        assert!(report.removed.is_empty());
        assert!(report.manifest.is_file());
    }

    #[test]
    fn test_manifest_has_only_dependencies() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        fs::write(
            temp.path().join("package.json"),
            r#"{"scripts":{"docs":"generate-docs"},"devDependencies":{"x":"1"}}"#,
        )
        .unwrap();

        WorkspaceReset::from_workspace(&ws).reset(&ws, false).unwrap();

        let text = fs::read_to_string(temp.path().join("package.json")).unwrap();
        insta::assert_snapshot!(text, @r###"
        {
          "name": "delivery-process-tutorial",
          "version": "1.0.0",
          "private": true,
          "type": "module",
          "dependencies": {
            "@libar-dev/delivery-process": "latest"
          }
        }
        "###);
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_failure_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let ws = workspace(&temp);
        let locked = temp.path().join("src");
        fs::create_dir_all(locked.join("inner")).unwrap();
        fs::write(locked.join("inner/file.ts"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

        let result = WorkspaceReset::from_workspace(&ws).reset(&ws, false);

        // Root ignores directory permissions; only assert when they applied.
        if locked.exists() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            assert!(matches!(result, Err(ResetError::Remove { .. })));
        }
    }
}

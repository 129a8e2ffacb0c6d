//! Snapshot capturer: copies designated paths after a part and lists the
//! workspace.
//!
//! All operations are blocking filesystem calls.

use crate::config::SnapshotConfig;
use crate::domain::{render_tree, PartLabel, Snapshot, Workspace, TREE_FILE};
use crate::error::{SnapshotError, SnapshotResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SnapshotCapturer {
    sources: Vec<PathBuf>,
    exclude: Vec<String>,
}

impl SnapshotCapturer {
    pub fn new(sources: Vec<PathBuf>, exclude: Vec<String>) -> Self {
        Self { sources, exclude }
    }

    pub fn from_config(config: &SnapshotConfig) -> Self {
        Self::new(config.sources.clone(), config.exclude.clone())
    }

    /// Capture the workspace into `snapshots/<label>/`.
    ///
    /// A previous snapshot with the same label is replaced. Sources that do
    /// not exist yet are skipped.
    pub fn capture(&self, workspace: &Workspace, label: &PartLabel) -> SnapshotResult<Snapshot> {
        let directory = workspace.snapshot_directory(label);
        prepare_directory(&directory)?;

        let mut copied = Vec::new();
        let mut skipped = Vec::new();

        for source in &self.sources {
            let from = workspace.resolve(source);
            match fs::metadata(&from) {
                Ok(_) => {
                    copy_recursive(&from, &directory.join(source), &workspace.output_directory)
                        .map_err(|e| SnapshotError::Copy {
                            path: from.clone(),
                            source: e,
                        })?;
                    copied.push(source.clone());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("Snapshot {}: {} not present, skipping", label, source.display());
                    skipped.push(source.clone());
                }
                Err(e) => {
                    return Err(SnapshotError::Copy {
                        path: from,
                        source: e,
                    })
                }
            }
        }

        let files = list_files(
            &workspace.root_path,
            &self.exclude,
            &workspace.output_directory,
        )
        .map_err(SnapshotError::Listing)?;
        fs::write(directory.join(TREE_FILE), render_tree(&files)).map_err(SnapshotError::Tree)?;

        tracing::info!(
            "Snapshot {}: copied {} of {} sources, {} files listed",
            label,
            copied.len(),
            self.sources.len(),
            files.len()
        );

        Ok(Snapshot {
            label: label.clone(),
            directory,
            copied,
            skipped,
            files,
        })
    }
}

fn prepare_directory(directory: &Path) -> SnapshotResult<()> {
    let prepare_err = |source| SnapshotError::Prepare {
        path: directory.to_path_buf(),
        source,
    };

    match fs::remove_dir_all(directory) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(prepare_err(e)),
    }
    fs::create_dir_all(directory).map_err(prepare_err)
}

/// Copy a file or directory tree, following symlinks. Never descends into
/// `skip`, which holds the snapshot being written.
fn copy_recursive(from: &Path, to: &Path, skip: &Path) -> io::Result<()> {
    if fs::metadata(from)?.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            let path = entry.path();
            if path == skip {
                continue;
            }
            copy_recursive(&path, &to.join(entry.file_name()), skip)?;
        }
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
    }
    Ok(())
}

/// Every non-directory entry under `root` as a sorted, `/`-separated relative
/// path. Directories named in `exclude` and the `skip` directory are not
/// descended into; symlinks are listed but not followed.
pub fn list_files(root: &Path, exclude: &[String], skip: &Path) -> io::Result<Vec<String>> {
    let mut files = Vec::new();
    walk(root, root, exclude, skip, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(
    root: &Path,
    dir: &Path,
    exclude: &[String],
    skip: &Path,
    files: &mut Vec<String>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if exclude.iter().any(|ex| name.to_str() == Some(ex.as_str())) || path == skip {
            continue;
        }

        if entry.file_type()?.is_dir() {
            walk(root, &path, exclude, skip, files)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            files.push(
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
            );
        }
    }
    Ok(())
}

//! Snapshot of the workspace taken after a part.

use super::PartLabel;
use std::path::PathBuf;

/// Filename of the sorted file listing inside every snapshot
pub const TREE_FILE: &str = "tree.txt";

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub label: PartLabel,
    /// Directory the snapshot was written to
    pub directory: PathBuf,
    /// Sources that existed and were copied
    pub copied: Vec<PathBuf>,
    /// Sources that did not exist yet
    pub skipped: Vec<PathBuf>,
    /// Sorted workspace-relative file paths written to `tree.txt`
    pub files: Vec<String>,
}

impl Snapshot {
    /// Contents of `tree.txt`
    pub fn tree_text(&self) -> String {
        render_tree(&self.files)
    }

    pub fn tree_path(&self) -> PathBuf {
        self.directory.join(TREE_FILE)
    }
}

/// One path per line, newline terminated
pub fn render_tree(files: &[String]) -> String {
    let mut out = String::with_capacity(files.iter().map(|f| f.len() + 1).sum());
    for file in files {
        out.push_str(file);
        out.push('\n');
    }
    out
}

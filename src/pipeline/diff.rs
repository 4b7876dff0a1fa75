// src/pipeline/diff.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::warn;

use crate::fs::FileSystem;
use crate::graph::normalize_path;

use super::FileRecord;

/// Set of files modified in the working tree, used by `--diff-only`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFilter {
    changed: BTreeSet<PathBuf>,
}

impl DiffFilter {
    /// Build from `git diff --name-only` output. Each line is resolved
    /// against `root` and normalised the same way pipeline records are.
    pub fn from_output(fs: &dyn FileSystem, root: &Path, output: &str) -> Self {
        let changed = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| normalize_path(fs, &root.join(line)))
            .collect();
        Self { changed }
    }

    /// Ask git which files under `root` are modified.
    pub async fn from_git(fs: &dyn FileSystem, root: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["diff", "--name-only", "--relative"])
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .await
            .context("running `git diff --name-only`")?;

        if !output.status.success() {
            bail!(
                "`git diff --name-only` failed in {:?}: {}",
                root,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let filter = Self::from_output(fs, root, &stdout);
        filter.announce(root);
        Ok(filter)
    }

    fn announce(&self, root: &Path) {
        let listing = self
            .changed
            .iter()
            .map(|p| {
                let shown = p.strip_prefix(root).unwrap_or(p);
                format!("    modified:   {}", shown.display())
            })
            .collect::<Vec<_>>()
            .join("\n");
        warn!(
            "--diff-only is enabled; tasks will only process these modified files:\n{listing}"
        );
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.changed.contains(path)
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn apply(&self, files: Vec<FileRecord>) -> Vec<FileRecord> {
        files.into_iter().filter(|f| self.contains(&f.path)).collect()
    }
}

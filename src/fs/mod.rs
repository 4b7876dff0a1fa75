// src/fs/mod.rs

use std::collections::HashSet;
use std::fmt::Debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Filesystem access used by source collection, the style graph and watch
/// path resolution. [`mock::MockFileSystem`] backs the unit tests.
pub trait FileSystem: Send + Sync + Debug {
    /// Whole file contents.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// Absolute path with symlinks and `.` / `..` resolved. Fails for
    /// missing paths.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
    /// Full paths of the entries of a directory, in no particular order.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// The disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("cannot read {path:?}"))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("cannot resolve {path:?}"))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        fs::read_dir(path)
            .with_context(|| format!("cannot list {path:?}"))?
            .map(|entry| entry.map(|e| e.path()).map_err(anyhow::Error::from))
            .collect()
    }
}

/// Every regular file below `root`, recursively, unsorted.
///
/// Paths are `root` joined with the entries as listed, so symlinks are not
/// resolved. A directory reached twice (e.g. through a symlink pointing back
/// up the tree) is only listed once.
pub fn walk_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if !seen_dirs.insert(fs.canonicalize(&dir)?) {
            continue;
        }
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Make `path` absolute against the working directory and fold `.` / `..`
/// components without touching the filesystem.
///
/// Used when a path cannot be canonicalized (e.g. the file was deleted).
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("/"))
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

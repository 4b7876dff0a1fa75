// src/graph/mod.rs

//! Style import graph and impacted-file resolution.
//!
//! - [`imports`] extracts `@import` / `@use` / `@forward` targets.
//! - [`build`] scans a directory and assembles a [`DependencyGraph`].
//! - [`dependency`] stores the graph and answers "who imports this file,
//!   directly or transitively".
//!
//! A changed partial only produces output through the entry files that pull
//! it in, so rebuilding means walking imported-by edges up to those entries.

pub mod build;
pub mod dependency;
pub mod imports;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fs::{normalize_lexically, FileSystem};

pub use build::{build_graph, GraphOptions};
pub use dependency::DependencyGraph;

/// Failure to build a [`DependencyGraph`]. No partial graph is ever returned.
#[derive(Error, Debug)]
pub enum GraphBuildError {
    #[error("style root {0:?} does not exist or is not a directory")]
    RootNotFound(PathBuf),

    #[error("cannot read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("cannot parse {path:?} (line {line}): {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Normalize a path into the form used as graph key.
///
/// Canonicalizes when the file exists (resolving symlinks and relative
/// segments); otherwise falls back to a lexical absolute form so lookups of
/// deleted files still land on the same key shape.
pub fn normalize_path(fs: &dyn FileSystem, path: &Path) -> PathBuf {
    fs.canonicalize(path)
        .unwrap_or_else(|_| normalize_lexically(path))
}

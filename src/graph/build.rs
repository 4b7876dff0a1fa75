// src/graph/build.rs

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::fs::{walk_files, FileSystem};

use super::imports::extract_imports;
use super::{DependencyGraph, GraphBuildError};

/// Knobs for [`build_graph`].
#[derive(Debug, Clone)]
pub struct GraphOptions {
    /// File extensions (without dot) treated as style sources.
    pub extensions: Vec<String>,
    /// Extra directories searched when an import is not found next to the
    /// importing file.
    pub load_paths: Vec<PathBuf>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["scss".to_string()],
            load_paths: Vec::new(),
        }
    }
}

impl GraphOptions {
    fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
    }
}

/// Scan `root` recursively and build the import graph of every style source.
///
/// Files reached through imports but living outside `root` (e.g. under a
/// load path) are parsed as well, so transitive edges through them are kept.
pub fn build_graph(
    fs: &dyn FileSystem,
    root: &Path,
    options: &GraphOptions,
) -> Result<DependencyGraph, GraphBuildError> {
    if !fs.is_dir(root) {
        return Err(GraphBuildError::RootNotFound(root.to_path_buf()));
    }

    let sources = collect_sources(fs, root, options)?;
    let mut graph = DependencyGraph::new();
    let mut queued: HashSet<PathBuf> = sources.iter().cloned().collect();
    let mut queue: VecDeque<PathBuf> = sources.into();

    while let Some(file) = queue.pop_front() {
        graph.add_file(file.clone());

        let bytes = fs.read(&file).map_err(|e| GraphBuildError::Io {
            path: file.clone(),
            message: format!("{e:#}"),
        })?;
        let text = String::from_utf8(bytes).map_err(|e| GraphBuildError::Parse {
            path: file.clone(),
            line: 0,
            message: format!("not valid UTF-8: {e}"),
        })?;
        let imports = extract_imports(&text).map_err(|e| GraphBuildError::Parse {
            path: file.clone(),
            line: e.line,
            message: e.message,
        })?;

        let base = file.parent().unwrap_or(root);
        for import in imports {
            match resolve_import(fs, base, &import.target, options) {
                Some(target) => {
                    graph.add_import(file.clone(), target.clone());
                    if queued.insert(target.clone()) {
                        queue.push_back(target);
                    }
                }
                None => {
                    debug!(
                        importer = ?file,
                        target = %import.target,
                        line = import.line,
                        "unresolved import; ignoring"
                    );
                }
            }
        }
    }

    info!(root = ?root, files = graph.len(), "built style dependency graph");
    Ok(graph)
}

/// Walk `root` and return canonical paths of all style sources, sorted.
fn collect_sources(
    fs: &dyn FileSystem,
    root: &Path,
    options: &GraphOptions,
) -> Result<Vec<PathBuf>, GraphBuildError> {
    let io_err = |path: &Path, e: anyhow::Error| GraphBuildError::Io {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    };

    let root = fs.canonicalize(root).map_err(|e| io_err(root, e))?;
    let mut files = Vec::new();
    for path in walk_files(fs, &root).map_err(|e| io_err(&root, e))? {
        if options.is_source(&path) {
            files.push(fs.canonicalize(&path).map_err(|e| io_err(&path, e))?);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Resolve an import target the way Sass does: relative to the importing
/// file first, then each load path; partial (`_name`) and index variants
/// for every configured extension.
fn resolve_import(
    fs: &dyn FileSystem,
    base: &Path,
    target: &str,
    options: &GraphOptions,
) -> Option<PathBuf> {
    let bases = std::iter::once(base).chain(options.load_paths.iter().map(|p| p.as_path()));

    for dir in bases {
        for candidate in candidates(&dir.join(target), options) {
            if fs.is_file(&candidate) {
                if let Ok(canon) = fs.canonicalize(&candidate) {
                    return Some(canon);
                }
            }
        }
    }
    None
}

fn candidates(requested: &Path, options: &GraphOptions) -> Vec<PathBuf> {
    let Some(name) = requested.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let parent = requested.parent().unwrap_or(Path::new(""));

    if options.is_source(requested) {
        return vec![requested.to_path_buf(), parent.join(format!("_{name}"))];
    }

    let mut out = Vec::new();
    for ext in &options.extensions {
        out.push(parent.join(format!("{name}.{ext}")));
        out.push(parent.join(format!("_{name}.{ext}")));
    }
    for ext in &options.extensions {
        out.push(requested.join(format!("_index.{ext}")));
        out.push(requested.join(format!("index.{ext}")));
    }
    out
}

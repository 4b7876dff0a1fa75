// src/graph/dependency.rs

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

use super::normalize_path;

/// Internal node structure: stores direct imports and direct importers.
#[derive(Debug, Clone, Default)]
struct GraphNode {
    /// Files this one imports.
    imports: BTreeSet<PathBuf>,
    /// Files that import this one.
    imported_by: BTreeSet<PathBuf>,
}

/// Import graph over style sources, keyed by canonical absolute path.
///
/// "Imported-by" is the primary index: the common question is "what has to
/// be rebuilt when X changes", which walks only X's ancestors. Sets are
/// ordered so traversals are reproducible for a fixed graph.
///
/// Cycles (mutual imports) are allowed. The graph is built once and then
/// only read; rescan the directory to pick up added or removed files.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<PathBuf, GraphNode>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file with no edges (no-op if already present).
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.nodes.entry(path.into()).or_default();
    }

    /// Record that `importer` directly imports `imported`.
    pub fn add_import(&mut self, importer: impl Into<PathBuf>, imported: impl Into<PathBuf>) {
        let importer = importer.into();
        let imported = imported.into();

        self.nodes
            .entry(importer.clone())
            .or_default()
            .imports
            .insert(imported.clone());
        self.nodes
            .entry(imported)
            .or_default()
            .imported_by
            .insert(importer);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All files in the graph, sorted.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.nodes.keys().map(|p| p.as_path())
    }

    /// Files directly imported by `path`.
    pub fn imports_of(&self, path: &Path) -> impl Iterator<Item = &Path> {
        self.nodes
            .get(path)
            .into_iter()
            .flat_map(|n| n.imports.iter().map(|p| p.as_path()))
    }

    /// Files that directly import `path`.
    pub fn importers_of(&self, path: &Path) -> impl Iterator<Item = &Path> {
        self.nodes
            .get(path)
            .into_iter()
            .flat_map(|n| n.imported_by.iter().map(|p| p.as_path()))
    }

    /// Every file that transitively imports `changed`, after normalizing the
    /// path the same way the graph keys were normalized.
    ///
    /// The changed file itself is never part of the result; callers that
    /// reprocess files must add it back (see
    /// [`crate::pipeline::inheritance::resolve_inheritance`]).
    pub fn find_impacted(&self, fs: &dyn FileSystem, changed: &Path) -> Vec<PathBuf> {
        self.impacted_by(&normalize_path(fs, changed))
    }

    /// Same as [`find_impacted`](Self::find_impacted) for an already
    /// normalized key.
    ///
    /// Depth-first pre-order over imported-by edges using an explicit stack:
    /// a direct importer is emitted before its own importers are expanded,
    /// siblings come out in path order, and each file appears at most once
    /// even when the imports form cycles. A key unknown to the graph yields
    /// an empty result.
    pub fn impacted_by(&self, key: &Path) -> Vec<PathBuf> {
        let Some(node) = self.nodes.get(key) else {
            return Vec::new();
        };

        let mut impacted = Vec::new();
        let mut visited: HashSet<&Path> = HashSet::new();
        visited.insert(key);

        // Reverse so the smallest path is popped first.
        let mut stack: Vec<&Path> = node.imported_by.iter().rev().map(|p| p.as_path()).collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            impacted.push(current.to_path_buf());

            if let Some(n) = self.nodes.get(current) {
                stack.extend(
                    n.imported_by
                        .iter()
                        .rev()
                        .map(|p| p.as_path())
                        .filter(|p| !visited.contains(p)),
                );
            }
        }

        impacted
    }
}

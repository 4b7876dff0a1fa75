// src/pipeline/inheritance.rs

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::cache::CacheError;
use crate::fs::FileSystem;
use crate::graph::DependencyGraph;

use super::{FileRecord, RecordCache};

/// Expand a set of changed style files with every file that (transitively)
/// imports them.
///
/// For each non-empty changed file the cached payload of each impacted
/// ancestor is emitted first, followed by the changed file's own cached
/// payload. The result is deduplicated by path, keeping the first
/// occurrence. Empty files are dropped.
///
/// Payloads come from `cache`, so every emitted file must have been observed
/// in `namespace` before; a miss is returned as-is.
pub fn resolve_inheritance(
    graph: &DependencyGraph,
    fs: &dyn FileSystem,
    cache: &RecordCache,
    namespace: &str,
    changed: &[FileRecord],
) -> Result<Vec<FileRecord>, CacheError> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();

    for file in changed {
        if file.is_empty() {
            debug!(file = ?file.path, "skipping empty file");
            continue;
        }

        let parents = graph.find_impacted(fs, &file.path);
        if !parents.is_empty() {
            debug!(file = ?file.path, parents = parents.len(), "adding importing files");
        }

        for path in parents.iter().chain(std::iter::once(&file.path)) {
            if seen.contains(path) {
                continue;
            }
            let entry = cache.get(namespace, path)?;
            seen.insert(path.clone());
            out.push(entry.payload);
        }
    }

    Ok(out)
}

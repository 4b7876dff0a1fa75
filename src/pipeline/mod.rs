// src/pipeline/mod.rs

//! Per-task file pipeline.
//!
//! A task run collects its sources ([`source`]), threads them through an
//! ordered list of [`Stage`]s and finally hands the surviving files to a
//! command template ([`template`]).
//!
//! Stages are the hook points shared by every task:
//! - `Diff` keeps only files reported by `git diff` ([`diff`]).
//! - `Cache` drops files whose content is unchanged since the task last saw
//!   them.
//! - `Inheritance` re-adds the style entry points that import a changed
//!   partial ([`inheritance`]).
//! - `SkipPartials` drops `_partial` files, which are never compiled alone.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{fingerprint, ContentCache};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::graph::DependencyGraph;

pub mod diff;
pub mod inheritance;
pub mod report;
pub mod source;
pub mod template;

pub use diff::DiffFilter;
pub use inheritance::resolve_inheritance;
pub use source::collect_sources;
pub use template::CommandTemplate;

/// One source file travelling through a task pipeline.
///
/// Records are cheap to clone; the content is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Canonical absolute path.
    pub path: PathBuf,
    /// Path relative to the family `src` directory, for reports.
    pub relative: PathBuf,
    pub contents: Arc<[u8]>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: impl Into<Arc<[u8]>>) -> Self {
        Self {
            path: path.into(),
            relative: relative.into(),
            contents: contents.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Sass partials start with an underscore.
    pub fn is_partial(&self) -> bool {
        is_partial(&self.path)
    }
}

pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Cache of file records, one namespace per task.
pub type RecordCache = ContentCache<FileRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Diff,
    Cache,
    Inheritance,
    SkipPartials,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Diff => "diff",
            Stage::Cache => "cache",
            Stage::Inheritance => "inheritance",
            Stage::SkipPartials => "skip-partials",
        };
        f.write_str(s)
    }
}

/// Everything a stage may need. Optional parts turn their stage into a
/// pass-through when absent.
pub struct StageContext<'a> {
    /// Cache namespace, the task name.
    pub namespace: &'a str,
    pub cache: &'a RecordCache,
    pub fs: &'a dyn FileSystem,
    pub diff: Option<&'a DiffFilter>,
    pub graph: Option<&'a DependencyGraph>,
}

/// Run `files` through `stages` in order.
pub fn apply_stages(
    stages: &[Stage],
    mut files: Vec<FileRecord>,
    ctx: &StageContext<'_>,
) -> Result<Vec<FileRecord>> {
    for stage in stages {
        let before = files.len();
        files = match stage {
            Stage::Diff => match ctx.diff {
                Some(filter) => filter.apply(files),
                None => files,
            },
            Stage::Cache => files
                .into_iter()
                .filter(|record| {
                    ctx.cache.observe(
                        ctx.namespace,
                        &record.path,
                        fingerprint(&record.contents),
                        record.clone(),
                    )
                })
                .collect(),
            Stage::Inheritance => match ctx.graph {
                Some(graph) => resolve_inheritance(graph, ctx.fs, ctx.cache, ctx.namespace, &files)?,
                None => files,
            },
            Stage::SkipPartials => files.into_iter().filter(|r| !r.is_partial()).collect(),
        };
        debug!(
            task = ctx.namespace,
            stage = %stage,
            before,
            after = files.len(),
            "applied pipeline stage"
        );
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::graph::{build_graph, GraphOptions};

    fn record(path: &str, contents: &str) -> FileRecord {
        FileRecord::new(path, path.trim_start_matches("/s/"), contents.as_bytes())
    }

    #[test]
    fn cache_stage_passes_only_changed_files() {
        let cache = RecordCache::new();
        let fs = MockFileSystem::new();
        let ctx = StageContext {
            namespace: "scripts-lint",
            cache: &cache,
            fs: &fs,
            diff: None,
            graph: None,
        };

        let first = apply_stages(&[Stage::Cache], vec![record("/s/a.js", "a"), record("/s/b.js", "b")], &ctx).unwrap();
        assert_eq!(first.len(), 2);

        let second = apply_stages(&[Stage::Cache], vec![record("/s/a.js", "a"), record("/s/b.js", "b2")], &ctx).unwrap();
        assert_eq!(second, vec![record("/s/b.js", "b2")]);
    }

    #[test]
    fn styles_stages_rebuild_entry_points_of_a_changed_partial() {
        let fs = MockFileSystem::new();
        fs.add_file("/s/main.scss", "@import 'vars';");
        fs.add_file("/s/admin.scss", "@import 'vars';");
        fs.add_file("/s/_vars.scss", "$c: red;");
        let graph = build_graph(&fs, Path::new("/s"), &GraphOptions::default()).unwrap();

        let cache = RecordCache::new();
        let ctx = StageContext {
            namespace: "styles-build",
            cache: &cache,
            fs: &fs,
            diff: None,
            graph: Some(&graph),
        };
        let stages = [Stage::Cache, Stage::Inheritance, Stage::SkipPartials];

        let all = vec![
            record("/s/_vars.scss", "$c: red;"),
            record("/s/admin.scss", "@import 'vars';"),
            record("/s/main.scss", "@import 'vars';"),
        ];
        let first = apply_stages(&stages, all.clone(), &ctx).unwrap();
        let names: Vec<_> = first.iter().map(|r| r.path.clone()).collect();
        assert_eq!(names, vec![PathBuf::from("/s/admin.scss"), PathBuf::from("/s/main.scss")]);

        let mut changed = all;
        changed[0] = record("/s/_vars.scss", "$c: blue;");
        let second = apply_stages(&stages, changed, &ctx).unwrap();
        let names: Vec<_> = second.iter().map(|r| r.path.clone()).collect();
        assert_eq!(names, vec![PathBuf::from("/s/admin.scss"), PathBuf::from("/s/main.scss")]);

        let third = apply_stages(&stages, second, &ctx).unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn partial_detection() {
        assert!(is_partial(Path::new("/a/_vars.scss")));
        assert!(!is_partial(Path::new("/a_b/vars.scss")));
    }
}

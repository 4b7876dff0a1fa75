// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::types::{task_name, AssetFamily, TaskKind};

/// Compiled `files` / `exclude` globs mapped to the targets they trigger.
///
/// The patterns are relative to the config root. The watcher passes
/// relative paths (e.g. `"src/styles/main.scss"`) into `matches`.
#[derive(Clone)]
pub struct WatchRule {
    name: String,
    patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
    tasks: Vec<String>,
    reload: bool,
}

impl fmt::Debug for WatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRule")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("tasks", &self.tasks)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

impl WatchRule {
    pub fn new(
        name: impl Into<String>,
        files: &[String],
        exclude: &[String],
        tasks: Vec<String>,
        reload: bool,
    ) -> Result<Self> {
        let name = name.into();
        let include = build_globset(files)
            .with_context(|| format!("building watch globset for {name}"))?;
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(
                build_globset(exclude)
                    .with_context(|| format!("building exclude globset for {name}"))?,
            )
        };

        Ok(Self {
            name,
            patterns: files.to_vec(),
            exclude_patterns: exclude.to_vec(),
            include,
            exclude: exclude_set,
            tasks,
            reload,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Targets (tasks or aliases) to run on a match.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Whether the server's reload command runs after the tasks.
    pub fn reload(&self) -> bool {
        self.reload
    }

    /// Returns true if this rule is interested in the given path (relative
    /// to the config root), e.g. `"src/styles/main.scss"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build the serve-mode watch rules for a config.
///
/// Configured `[[server.watchers]]` come first, in file order. With
/// `derive_watchers` (the default) each configured family adds a rule
/// watching `<src>/<glob>` that runs the family's build and lint tasks.
pub fn build_watch_rules(cfg: &ConfigFile) -> Result<Vec<WatchRule>> {
    let Some(server) = &cfg.server else {
        return Ok(Vec::new());
    };
    let mut rules = Vec::new();

    for (idx, watcher) in server.watchers.iter().enumerate() {
        rules.push(WatchRule::new(
            format!("watcher #{}", idx + 1),
            &watcher.files,
            &watcher.exclude,
            watcher.tasks.clone(),
            watcher.reload,
        )?);
    }

    if server.derive_watchers {
        for family in AssetFamily::ALL {
            let Some(fc) = cfg.family(family) else {
                continue;
            };
            let tasks: Vec<String> = [TaskKind::Build, TaskKind::Lint]
                .into_iter()
                .filter(|&kind| fc.is_enabled(family, kind))
                .map(|kind| task_name(family, kind))
                .collect();
            if tasks.is_empty() {
                continue;
            }

            let pattern = join_pattern(&cfg.root, &fc.src_dir(family), &fc.glob(family));
            rules.push(WatchRule::new(
                family.as_str(),
                &[pattern],
                &[],
                tasks,
                true,
            )?);
        }
    }

    Ok(rules)
}

/// `<src>/<glob>` with `src` made relative to `root` when possible.
fn join_pattern(root: &Path, src: &Path, glob: &str) -> String {
    let src = src.strip_prefix(root).unwrap_or(src);
    let src = src.to_string_lossy().replace('\\', "/");
    let src = src.trim_start_matches("./").trim_end_matches('/');
    if src.is_empty() || src == "." {
        glob.to_string()
    } else {
        format!("{src}/{glob}")
    }
}

/// Build a GlobSet from simple string patterns; `*` stays within one path
/// segment.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

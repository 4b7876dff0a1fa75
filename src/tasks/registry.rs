// src/tasks/registry.rs

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::{AssetflowError, Result};
use crate::graph::GraphOptions;
use crate::pipeline::{CommandTemplate, Stage};
use crate::types::{task_name, AssetFamily, TaskKind, TaskName, DEFAULT_TARGET, SERVE_TARGET};

/// Stage order for tasks compiling styles. The diff filter runs before
/// inheritance so a modified partial still rebuilds its entry files.
pub const STYLES_BUILD_STAGES: [Stage; 4] =
    [Stage::Cache, Stage::Diff, Stage::Inheritance, Stage::SkipPartials];

/// Stage order for every other task.
pub const DEFAULT_STAGES: [Stage; 2] = [Stage::Diff, Stage::Cache];

/// A fully resolved task: where its files come from, which stages they pass
/// and which command consumes them.
#[derive(Debug, Clone)]
pub struct TaskDef {
    pub name: TaskName,
    pub family: AssetFamily,
    pub kind: TaskKind,
    /// Absolute or root-relative source directory.
    pub src: PathBuf,
    pub dist: PathBuf,
    pub glob: String,
    pub command: CommandTemplate,
    pub stages: Vec<Stage>,
    /// Set when the task needs the style import graph.
    pub graph: Option<GraphOptions>,
}

impl TaskDef {
    pub fn needs_graph(&self) -> bool {
        self.stages.contains(&Stage::Inheritance)
    }
}

/// What a CLI target resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Run these tasks once, in order.
    Tasks(Vec<TaskName>),
    /// Enter watch/serve mode.
    Serve,
}

#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskDef>,
    /// Task names in family then kind order.
    order: Vec<TaskName>,
    aliases: BTreeMap<String, Vec<String>>,
    has_server: bool,
    root: PathBuf,
}

impl TaskRegistry {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut tasks = BTreeMap::new();
        let mut order = Vec::new();

        for family in AssetFamily::ALL {
            let Some(fc) = cfg.family(family) else {
                continue;
            };
            for &kind in family.supported_kinds() {
                let Some(command) = fc.command(family, kind) else {
                    continue;
                };
                let name = task_name(family, kind);
                let styles_build = family == AssetFamily::Styles && kind == TaskKind::Build;

                let graph = styles_build.then(|| GraphOptions {
                    extensions: fc.extensions(),
                    load_paths: fc
                        .load_paths
                        .iter()
                        .flatten()
                        .map(|p| cfg.resolve_path(p))
                        .collect(),
                });
                let stages = if styles_build {
                    STYLES_BUILD_STAGES.to_vec()
                } else {
                    DEFAULT_STAGES.to_vec()
                };

                let def = TaskDef {
                    name: name.clone(),
                    family,
                    kind,
                    src: cfg.resolve_path(&fc.src_dir(family)),
                    dist: cfg.resolve_path(&fc.dist_dir(family)),
                    glob: fc.glob(family),
                    command: CommandTemplate::new(command),
                    stages,
                    graph,
                };
                debug!(task = %name, cmd = %def.command.as_str(), "registered task");
                order.push(name.clone());
                tasks.insert(name, def);
            }
        }

        Self {
            tasks,
            order,
            aliases: cfg.alias.clone(),
            has_server: cfg.server.is_some(),
            root: cfg.root.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.get(name)
    }

    /// All tasks in family then kind order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskDef> {
        self.order.iter().filter_map(|n| self.tasks.get(n))
    }

    pub fn aliases(&self) -> &BTreeMap<String, Vec<String>> {
        &self.aliases
    }

    pub fn has_server(&self) -> bool {
        self.has_server
    }

    /// Directory commands run in and watch patterns are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Members of a built-in alias, or `None` if `name` is not one.
    fn builtin_members(&self, name: &str) -> Option<Vec<String>> {
        let kind = match name {
            "build" => TaskKind::Build,
            "lint" => TaskKind::Lint,
            "format" => TaskKind::Format,
            DEFAULT_TARGET => return Some(vec!["build".into(), "lint".into()]),
            _ => return None,
        };
        Some(
            self.tasks()
                .filter(|t| t.kind == kind)
                .map(|t| t.name.clone())
                .collect(),
        )
    }

    /// Resolve a top-level target.
    pub fn resolve_target(&self, name: &str) -> Result<Target> {
        if name == SERVE_TARGET || (name == DEFAULT_TARGET && self.has_server) {
            if !self.has_server {
                return Err(AssetflowError::TaskNotFound(format!(
                    "'{name}' requires a [server] section"
                )));
            }
            return Ok(Target::Serve);
        }
        self.resolve_tasks(&[name.to_string()]).map(Target::Tasks)
    }

    /// Flatten targets (tasks, user aliases, `build` / `lint` / `format` /
    /// `default`) into an ordered task list. Duplicates keep their first
    /// position.
    pub fn resolve_tasks(&self, targets: &[String]) -> Result<Vec<TaskName>> {
        let mut out = Vec::new();
        let mut emitted: HashSet<TaskName> = HashSet::new();
        let mut expanding: HashSet<String> = HashSet::new();

        for target in targets {
            self.flatten(target, &mut out, &mut emitted, &mut expanding)?;
        }
        Ok(out)
    }

    fn flatten(
        &self,
        target: &str,
        out: &mut Vec<TaskName>,
        emitted: &mut HashSet<TaskName>,
        expanding: &mut HashSet<String>,
    ) -> Result<()> {
        if self.tasks.contains_key(target) {
            if emitted.insert(target.to_string()) {
                out.push(target.to_string());
            }
            return Ok(());
        }

        let members = match self.aliases.get(target) {
            Some(members) => members.clone(),
            None => self
                .builtin_members(target)
                .ok_or_else(|| AssetflowError::TaskNotFound(target.to_string()))?,
        };

        if !expanding.insert(target.to_string()) {
            return Err(AssetflowError::AliasCycle(format!(
                "alias '{target}' refers to itself"
            )));
        }
        for member in &members {
            self.flatten(member, out, emitted, expanding)?;
        }
        expanding.remove(target);
        Ok(())
    }
}

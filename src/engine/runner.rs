// src/engine/runner.rs

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{AssetflowError, Result};
use crate::exec::{Invocation, ToolBackend, ToolOutcome};
use crate::fs::FileSystem;
use crate::graph::build_graph;
use crate::pipeline::report::render_report;
use crate::pipeline::template::TemplateVars;
use crate::pipeline::{apply_stages, collect_sources, DiffFilter, FileRecord, RecordCache, StageContext};
use crate::tasks::{Target, TaskRegistry};
use crate::types::{TaskKind, TaskName};

/// Options affecting how task failures are handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Treat lint failures as fatal.
    pub fail_after_error: bool,
}

/// What one task run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskName,
    /// Files handed to the tool, after all stages.
    pub files: Vec<FileRecord>,
    pub invocations: usize,
    /// Exit code of the first failing invocation that was tolerated.
    pub failed: Option<i32>,
}

/// Runs tasks sequentially through their pipelines against a [`ToolBackend`].
///
/// The content cache lives as long as the runner, so repeated runs in serve
/// mode only hand changed files to the tools.
pub struct Runner<B> {
    registry: Arc<TaskRegistry>,
    backend: B,
    fs: Arc<dyn FileSystem>,
    cache: Arc<RecordCache>,
    diff: Option<DiffFilter>,
    options: RunOptions,
}

impl<B: ToolBackend> Runner<B> {
    pub fn new(registry: Arc<TaskRegistry>, backend: B, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            registry,
            backend,
            fs,
            cache: Arc::new(RecordCache::new()),
            diff: None,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_diff_filter(mut self, diff: DiffFilter) -> Self {
        self.diff = Some(diff);
        self
    }

    pub fn with_cache(mut self, cache: Arc<RecordCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Resolve a non-serve target and run it. Serve is driven by
    /// [`crate::server`].
    pub async fn run_target(&self, target: &str) -> Result<Vec<TaskReport>> {
        match self.registry.resolve_target(target)? {
            Target::Tasks(tasks) => self.run_tasks(&tasks).await,
            Target::Serve => Err(AssetflowError::ConfigError(format!(
                "target '{target}' starts the dev server and cannot be run as a batch"
            ))),
        }
    }

    /// Run tasks in order, stopping at the first fatal failure.
    pub async fn run_tasks(&self, tasks: &[TaskName]) -> Result<Vec<TaskReport>> {
        let mut reports = Vec::with_capacity(tasks.len());
        for task in tasks {
            reports.push(self.run_task(task).await?);
        }
        Ok(reports)
    }

    pub async fn run_task(&self, name: &str) -> Result<TaskReport> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| AssetflowError::TaskNotFound(name.to_string()))?;
        info!(task = %def.name, "starting task");

        let sources = collect_sources(self.fs.as_ref(), &def.src, &def.glob)?;

        let graph = match &def.graph {
            Some(options) if def.needs_graph() && !sources.is_empty() => {
                Some(build_graph(self.fs.as_ref(), &def.src, options)?)
            }
            _ => None,
        };

        let ctx = StageContext {
            namespace: &def.name,
            cache: &self.cache,
            fs: self.fs.as_ref(),
            diff: self.diff.as_ref(),
            graph: graph.as_ref(),
        };
        let files = apply_stages(&def.stages, sources, &ctx)?;

        let mut report = TaskReport {
            task: def.name.clone(),
            files: Vec::new(),
            invocations: 0,
            failed: None,
        };

        if files.is_empty() {
            info!(task = %def.name, "no changed files; nothing to do");
            return Ok(report);
        }

        let vars = TemplateVars {
            src: &def.src,
            dist: &def.dist,
        };
        for command in def.command.expand(vars, &files) {
            let invocation = Invocation::new(def.name.clone(), command, self.registry.root());
            let outcome = self.backend.run(&invocation).await?;
            report.invocations += 1;

            if outcome.success {
                continue;
            }
            if def.kind == TaskKind::Lint && !self.options.fail_after_error {
                warn!(
                    task = %def.name,
                    exit_code = outcome.code,
                    "lint reported problems; continuing (use --fail-after-error to stop)"
                );
                if report.failed.is_none() {
                    report.failed = Some(outcome.code);
                }
                continue;
            }
            return Err(AssetflowError::TaskFailed {
                task: def.name.clone(),
                code: outcome.code,
            });
        }

        if report.failed.is_none() {
            if let Some(table) = render_report(&files) {
                info!(task = %def.name, "processed files:\n{table}");
            }
        }
        report.files = files;
        Ok(report)
    }

    /// Run an ad hoc command (e.g. the reload command) in the project root.
    pub async fn run_command(&self, label: &str, command: &str) -> Result<ToolOutcome> {
        let invocation = Invocation::new(label, command, self.registry.root());
        self.backend.run(&invocation).await
    }
}

// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod tasks;
pub mod types;
pub mod watch;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{RunOptions, Runner};
use crate::exec::ShellBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::DiffFilter;
use crate::tasks::{Target, TaskRegistry};
use crate::watch::build_watch_rules;

/// Run one CLI invocation: load the config, then dry-run, run the resolved
/// tasks once, or enter serve mode.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {:?}", config_path))?;
    let registry = Arc::new(TaskRegistry::from_config(&cfg));

    if args.dry_run {
        let mut out = std::io::stdout().lock();
        write_dry_run(&mut out, &cfg, &registry, &args.target)?;
        return Ok(());
    }

    let target = registry.resolve_target(&args.target)?;
    check_diff_only(&target, args.diff_only)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let mut runner = Runner::new(Arc::clone(&registry), ShellBackend, Arc::clone(&fs))
        .with_options(RunOptions {
            fail_after_error: args.fail_after_error,
        });
    if args.diff_only {
        let diff = DiffFilter::from_git(fs.as_ref(), registry.root()).await?;
        runner = runner.with_diff_filter(diff);
    }

    match target {
        Target::Tasks(tasks) => {
            info!(target = %args.target, ?tasks, "running target");
            let reports = runner.run_tasks(&tasks).await?;
            let invocations: usize = reports.iter().map(|r| r.invocations).sum();
            info!(tasks = reports.len(), invocations, "done");
        }
        Target::Serve => {
            let server_cfg = cfg.server.clone().unwrap_or_default();
            let rules = build_watch_rules(&cfg)?;
            server::serve(&runner, &server_cfg, rules).await?;
        }
    }
    Ok(())
}

/// `--diff-only` is read from `git diff` once at startup, which would go
/// stale over a serve session, so serve mode refuses it.
fn check_diff_only(target: &Target, diff_only: bool) -> Result<()> {
    if diff_only && *target == Target::Serve {
        bail!("--diff-only cannot be combined with serve mode; run a task target instead");
    }
    Ok(())
}

/// Dry-run output: tasks, aliases, what the target resolves to and the
/// serve-mode watch rules.
pub fn write_dry_run(
    out: &mut impl Write,
    cfg: &ConfigFile,
    registry: &TaskRegistry,
    target: &str,
) -> Result<()> {
    writeln!(out, "assetflow dry-run")?;
    writeln!(out, "  root = {:?}", cfg.root)?;
    writeln!(out)?;

    writeln!(out, "tasks:")?;
    for task in registry.tasks() {
        writeln!(out, "  - {}", task.name)?;
        writeln!(out, "      cmd: {}", task.command.as_str())?;
        writeln!(out, "      src: {}  ({})", task.src.display(), task.glob)?;
        writeln!(out, "      dist: {}", task.dist.display())?;
        let stages: Vec<String> = task.stages.iter().map(|s| s.to_string()).collect();
        writeln!(out, "      stages: {}", stages.join(" -> "))?;
    }

    if !registry.aliases().is_empty() {
        writeln!(out)?;
        writeln!(out, "aliases:")?;
        for (name, members) in registry.aliases() {
            writeln!(out, "  - {name} = {members:?}")?;
        }
    }

    writeln!(out)?;
    match registry.resolve_target(target)? {
        Target::Tasks(tasks) => writeln!(out, "target '{target}' runs: {tasks:?}")?,
        Target::Serve => {
            writeln!(out, "target '{target}' starts serve mode")?;
            if let Some(server) = &cfg.server {
                if let Some(cmd) = &server.cmd {
                    writeln!(out, "  server: {cmd}")?;
                }
                if let Some(cmd) = &server.reload_cmd {
                    writeln!(out, "  reload: {cmd}")?;
                }
                if !server.before_serve.is_empty() {
                    writeln!(out, "  before_serve: {:?}", server.before_serve)?;
                }
            }
            writeln!(out, "watch rules:")?;
            for rule in build_watch_rules(cfg)? {
                writeln!(out, "  - {}: {:?}", rule.name(), rule.patterns())?;
                if !rule.exclude_patterns().is_empty() {
                    writeln!(out, "      exclude: {:?}", rule.exclude_patterns())?;
                }
                writeln!(out, "      tasks: {:?}  reload: {}", rule.tasks(), rule.reload())?;
            }
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

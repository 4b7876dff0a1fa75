// src/server/mod.rs

//! Serve mode: initial build, long-lived dev server, watch-triggered rebuilds.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::engine::{PendingTriggers, Runner};
use crate::errors::Result;
use crate::exec::{LongLivedProcess, ToolBackend};
use crate::watch::{spawn_watcher, WatchRule, WatchTrigger};

/// Events arriving within this window after a trigger join its batch.
const DEBOUNCE: Duration = Duration::from_millis(50);

const SERVER_TASK: &str = "server";
const RELOAD_TASK: &str = "reload";

/// Run serve mode until Ctrl-C.
///
/// Order: `before_serve`, then `build` and `lint`, then the server command,
/// then the watch loop.
pub async fn serve<B: ToolBackend>(
    runner: &Runner<B>,
    server: &ServerConfig,
    rules: Vec<WatchRule>,
) -> Result<()> {
    let mut initial = server.before_serve.clone();
    initial.extend(["build".to_string(), "lint".to_string()]);
    run_batch(runner, &initial).await;

    let root = runner.registry().root().to_path_buf();
    let mut process = match &server.cmd {
        Some(cmd) => Some(LongLivedProcess::spawn(SERVER_TASK, cmd, &root)?),
        None => None,
    };

    let (tx, rx) = mpsc::channel::<WatchTrigger>(256);
    let _watcher = spawn_watcher(&root, rules, tx)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        info!("Ctrl-C received; shutting down");
    };
    run_serve_loop(runner, server.reload_cmd.as_deref(), rx, shutdown).await;

    if let Some(mut proc) = process.take() {
        if let Some(code) = proc.try_exit_code() {
            warn!(exit_code = code, "server command had already exited");
        }
        proc.shutdown().await;
    }
    Ok(())
}

/// Consume watch triggers until `shutdown` resolves or the channel closes.
///
/// Triggers that arrive while a batch runs (or within the debounce window)
/// are merged into the next batch. Task failures are logged and the loop
/// keeps going. Returns the number of batches run.
pub async fn run_serve_loop<B, F>(
    runner: &Runner<B>,
    reload_cmd: Option<&str>,
    mut rx: mpsc::Receiver<WatchTrigger>,
    shutdown: F,
) -> usize
where
    B: ToolBackend,
    F: Future<Output = ()>,
{
    let mut pending = PendingTriggers::new();
    let mut batches = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            next = rx.recv() => {
                let Some(trigger) = next else {
                    info!("watch channel closed; leaving serve loop");
                    break;
                };
                info!(path = %trigger.path, "change detected");
                pending.record(trigger);
            }
        }

        tokio::time::sleep(DEBOUNCE).await;
        while let Ok(trigger) = rx.try_recv() {
            pending.record(trigger);
        }

        let (targets, reload) = pending.drain();
        batches += 1;
        let ok = run_batch(runner, &targets).await;

        if reload && ok {
            if let Some(cmd) = reload_cmd {
                match runner.run_command(RELOAD_TASK, cmd).await {
                    Ok(outcome) if !outcome.success => {
                        warn!(exit_code = outcome.code, "reload command failed");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "could not run reload command"),
                }
            }
        }
    }

    batches
}

/// Resolve and run `targets`, logging instead of propagating failures.
async fn run_batch<B: ToolBackend>(runner: &Runner<B>, targets: &[String]) -> bool {
    let tasks = match runner.registry().resolve_tasks(targets) {
        Ok(tasks) => tasks,
        Err(e) => {
            error!(error = %e, "could not resolve targets");
            return false;
        }
    };
    match runner.run_tasks(&tasks).await {
        Ok(_) => true,
        Err(e) => {
            error!(error = %e, "task run failed; waiting for the next change");
            false
        }
    }
}

// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::event_handler::{is_relevant, process_file_change};
use crate::watch::patterns::WatchRule;
use crate::watch::WatchTrigger;

/// Keeps the OS watcher registered. Watching stops when this is dropped.
pub struct WatcherHandle {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl WatcherHandle {
    /// Directory being watched (canonical when it could be resolved).
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").field("root", &self.root).finish()
    }
}

/// Watch `root` recursively and send a [`WatchTrigger`] into `tx` for every
/// changed path that one of `rules` matches.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    rules: Vec<WatchRule>,
    tx: mpsc::Sender<WatchTrigger>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // Fails only once the pump task is gone.
                let _ = event_tx.send(event);
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {root:?}"))?;
    info!(root = ?root, rules = rules.len(), "watching for changes");

    tokio::spawn(pump_events(root.clone(), rules, event_rx, tx));

    Ok(WatcherHandle {
        root,
        _watcher: watcher,
    })
}

/// Turn raw notify events into triggers until either channel closes.
async fn pump_events(
    root: PathBuf,
    rules: Vec<WatchRule>,
    mut events: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::Sender<WatchTrigger>,
) {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    while let Some(event) = events.recv().await {
        if !is_relevant(&event.kind) {
            continue;
        }
        debug!(kind = ?event.kind, paths = ?event.paths, "file event");
        for path in &event.paths {
            if !process_file_change(fs.as_ref(), &root, path, &rules, &tx).await {
                debug!("serve loop gone; stopping watcher");
                return;
            }
        }
    }
}

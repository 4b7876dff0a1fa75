// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use notify::EventKind;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str_resolved;
use crate::watch::patterns::WatchRule;
use crate::watch::WatchTrigger;

/// Only content changes trigger work; plain reads and metadata-free
/// `Access` events are ignored.
pub fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Map one changed path onto the rules watching it.
///
/// Targets of every matching rule are merged in rule order (duplicates
/// dropped); the trigger requests a reload if any matching rule does.
/// Returns `None` when no rule matches.
pub fn trigger_for_path(
    fs: &dyn FileSystem,
    root: &Path,
    path: &Path,
    rules: &[WatchRule],
) -> Option<WatchTrigger> {
    let Some(rel) = relative_str_resolved(fs, root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return None;
    };

    let matching: Vec<&WatchRule> = rules.iter().filter(|r| r.matches(&rel)).collect();
    if matching.is_empty() {
        return None;
    }

    let mut tasks: Vec<String> = Vec::new();
    for rule in &matching {
        for task in rule.tasks() {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
    }
    let reload = matching.iter().any(|r| r.reload());

    debug!(
        rel = %rel,
        rules = ?matching.iter().map(|r| r.name()).collect::<Vec<_>>(),
        ?tasks,
        reload,
        "watch match"
    );

    Some(WatchTrigger {
        path: rel,
        tasks,
        reload,
    })
}

/// Process a single changed path and forward the resulting trigger.
///
/// Returns `false` once the receiving side has gone away, so the watcher
/// loop can stop.
pub async fn process_file_change(
    fs: &dyn FileSystem,
    root: &Path,
    path: &Path,
    rules: &[WatchRule],
    tx: &mpsc::Sender<WatchTrigger>,
) -> bool {
    let Some(trigger) = trigger_for_path(fs, root, path, rules) else {
        return true;
    };
    if let Err(err) = tx.send(trigger).await {
        warn!("failed to send watch trigger: {err}");
        return false;
    }
    true
}

// src/engine/queue.rs

use std::collections::HashSet;

use tracing::debug;

use crate::watch::WatchTrigger;

/// Triggers that arrive while a batch of tasks is already running.
///
/// Semantics:
/// - Everything recorded before the next [`drain`](Self::drain) is merged
///   into a single batch, so a burst of saves (or an editor writing several
///   files) leads to one rebuild.
/// - Targets keep the order they first arrived in; repeats are dropped.
/// - The batch requests a reload if any merged trigger did.
#[derive(Debug, Default)]
pub struct PendingTriggers {
    targets: Vec<String>,
    seen: HashSet<String>,
    reload: bool,
}

impl PendingTriggers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are no queued triggers.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && !self.reload
    }

    pub fn record(&mut self, trigger: WatchTrigger) {
        for target in trigger.tasks {
            let inserted = self.seen.insert(target.clone());
            if inserted {
                self.targets.push(target);
            }
        }
        self.reload |= trigger.reload;
        debug!(
            pending = self.targets.len(),
            reload = self.reload,
            "merged trigger into pending batch"
        );
    }

    /// Take the merged batch, leaving the queue empty.
    pub fn drain(&mut self) -> (Vec<String>, bool) {
        self.seen.clear();
        let reload = std::mem::take(&mut self.reload);
        (std::mem::take(&mut self.targets), reload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(tasks: &[&str], reload: bool) -> WatchTrigger {
        WatchTrigger {
            path: "src/x".into(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            reload,
        }
    }

    #[test]
    fn coalesces_in_arrival_order() {
        let mut q = PendingTriggers::new();
        assert!(q.is_empty());

        q.record(trigger(&["styles-build", "styles-lint"], true));
        q.record(trigger(&["scripts-build", "styles-build"], false));

        let (tasks, reload) = q.drain();
        assert_eq!(tasks, vec!["styles-build", "styles-lint", "scripts-build"]);
        assert!(reload);
        assert!(q.is_empty());
    }

    #[test]
    fn reload_only_trigger_is_not_empty() {
        let mut q = PendingTriggers::new();
        q.record(trigger(&[], true));
        assert!(!q.is_empty());
        assert_eq!(q.drain(), (Vec::<String>::new(), true));
    }
}

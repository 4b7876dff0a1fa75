// src/watch/mod.rs

//! File watching for serve mode.
//!
//! This module is responsible for:
//! - Compiling watch rules (`files` / `exclude` globs) from the config,
//!   including the rules derived from each asset family.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning filesystem changes into [`WatchTrigger`]s.
//!
//! It does **not** run anything; the serve loop decides what to do with a
//! trigger.

pub mod event_handler;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::{build_watch_rules, WatchRule};
pub use watcher::{spawn_watcher, WatcherHandle};

/// A changed path and the work it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTrigger {
    /// Changed path relative to the config root.
    pub path: String,
    /// Targets (tasks or aliases) to run, in rule order.
    pub tasks: Vec<String>,
    /// Run the server's reload command afterwards.
    pub reload: bool,
}

// src/exec/backend.rs

//! Pluggable tool backend abstraction.
//!
//! The runner talks to a `ToolBackend` instead of spawning processes itself.
//! This makes it easy to swap in a fake backend in tests while keeping the
//! production implementation in [`super::task_runner`].
//!
//! - `ShellBackend` is the default implementation used by `assetflow`. It
//!   runs each invocation through the platform shell.
//! - Tests can provide their own `ToolBackend` that, for example, records
//!   which commands were run and returns scripted outcomes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::TaskName;

use super::task_runner::run_shell_command;

/// One concrete command a task wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Task (or pseudo task, e.g. `reload`) the command belongs to; used
    /// for logging.
    pub task: TaskName,
    pub command: String,
    /// Working directory, normally the config root.
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(task: impl Into<TaskName>, command: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            task: task.into(),
            command: command.into(),
            cwd: cwd.into(),
        }
    }
}

/// Exit status of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    pub success: bool,
    /// Exit code, `-1` when the process was terminated by a signal.
    pub code: i32,
}

impl ToolOutcome {
    pub fn success() -> Self {
        Self { success: true, code: 0 }
    }

    pub fn failed(code: i32) -> Self {
        Self { success: false, code }
    }
}

/// Trait abstracting how tool invocations are executed.
///
/// Production code uses [`ShellBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ToolBackend: Send + Sync {
    /// Run one invocation to completion.
    ///
    /// A tool that starts and exits non-zero is an `Ok` outcome; `Err` is
    /// reserved for failing to run it at all.
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutcome>> + Send + 'a>>;
}

/// Real backend used in production: `sh -c` / `cmd /C` via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellBackend;

impl ToolBackend for ShellBackend {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolOutcome>> + Send + 'a>> {
        Box::pin(async move { Ok(run_shell_command(invocation).await?) })
    }
}

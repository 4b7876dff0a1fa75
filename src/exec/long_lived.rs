// src/exec/long_lived.rs

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Child;
use tracing::{info, warn};

use super::task_runner::{forward_lines, shell_command};

/// A process that runs for the whole serve session (the live-reload server).
///
/// The child is killed when this handle is dropped.
#[derive(Debug)]
pub struct LongLivedProcess {
    name: String,
    child: Child,
}

impl LongLivedProcess {
    /// Spawn `command` in `cwd`, forwarding its output to the log.
    pub fn spawn(name: &str, command: &str, cwd: &Path) -> Result<Self> {
        info!(task = name, cmd = command, "starting long-lived process");

        let mut cmd = shell_command(command);
        cmd.current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning long-lived process '{name}'"))?;

        if let Some(stdout) = child.stdout.take() {
            forward_lines(name.to_string(), stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(name.to_string(), stderr, true);
        }

        Ok(Self {
            name: name.to_string(),
            child,
        })
    }

    /// Returns the exit code if the process already stopped.
    pub fn try_exit_code(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(status.code().unwrap_or(-1)),
            Ok(None) => None,
            Err(e) => {
                warn!(task = %self.name, error = %e, "failed to poll long-lived process");
                None
            }
        }
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(task = %self.name, error = %e, "failed to kill long-lived process");
        }
        info!(task = %self.name, "stopped long-lived process");
    }
}

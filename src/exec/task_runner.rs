// src/exec/task_runner.rs

//! Individual tool process runner.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::backend::{Invocation, ToolOutcome};

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Forward every line of a child stream to `tracing`.
///
/// Tools print their diagnostics (lint errors, compile errors) on either
/// stream, so stdout goes to info and stderr to warn.
pub(crate) fn forward_lines<R>(task: String, stream: R, is_stderr: bool) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_stderr {
                warn!(task = %task, "{}", line);
            } else {
                info!(task = %task, "{}", line);
            }
        }
    })
}

/// Run a single tool process to completion and report its exit status.
pub async fn run_shell_command(invocation: &Invocation) -> Result<ToolOutcome> {
    info!(
        task = %invocation.task,
        cmd = %invocation.command,
        "starting tool process"
    );

    let mut cmd = shell_command(&invocation.command);
    cmd.current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", invocation.task))?;

    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(invocation.task.clone(), stdout, false));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(invocation.task.clone(), stderr, true));
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", invocation.task))?;

    // Drain output before reporting so logs stay in order.
    for reader in readers {
        let _ = reader.await;
    }

    let code = status.code().unwrap_or(-1);
    info!(
        task = %invocation.task,
        exit_code = code,
        success = status.success(),
        "tool process exited"
    );

    Ok(if status.success() {
        ToolOutcome::success()
    } else {
        ToolOutcome::failed(code)
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_shell_command(&Invocation::new("t", "echo hi", dir.path())).await.unwrap();
        assert_eq!(ok, ToolOutcome::success());

        let failed = run_shell_command(&Invocation::new("t", "exit 3", dir.path())).await.unwrap();
        assert_eq!(failed, ToolOutcome::failed(3));
    }

    #[tokio::test]
    async fn runs_in_the_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = run_shell_command(&Invocation::new("t", "touch marker", dir.path())).await.unwrap();
        assert!(out.success);
        assert!(dir.path().join("marker").exists());
    }
}

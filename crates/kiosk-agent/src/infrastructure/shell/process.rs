//! Process-backed shell with a bounded wait.
//!
//! [`ProcessShell`] runs `<program> -c <command>` with `tokio::process`.
//! Two flavours are used by the agent:
//!
//! - `ProcessShell::su(..)` – the elevated execution context (`su -c ...`).
//! - `ProcessShell::sh(..)` – an ordinary shell for device queries that need
//!   no elevation.
//!
//! # Why a timeout? (for beginners)
//!
//! `su` may pop up a permission prompt and simply wait for a human.  Without
//! a limit, one `enableDeviceOwner` request would stall its session forever.
//! Every child is therefore spawned with `kill_on_drop(true)` and awaited
//! under `tokio::time::timeout`, stdin writes included; when the timeout
//! fires, the future is dropped, which drops the child, which kills it.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::application::ports::{ElevatedShell, ShellError, ShellOutput};

/// Default bounded wait for one shell invocation.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ProcessShell {
    program: String,
    timeout: Duration,
}

impl ProcessShell {
    /// An elevated shell using the given `su` binary.
    pub fn su(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// A plain, unprivileged `sh`.
    pub fn sh(timeout: Duration) -> Self {
        Self {
            program: "sh".to_string(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_child(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<ShellOutput, ShellError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ShellError::NotFound(self.program.clone())
            } else {
                ShellError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            }
        })?;

        // Feeding stdin counts against the deadline too: a child that never
        // reads would otherwise block the write forever.
        let interaction = async move {
            if let Some(input) = stdin {
                if let Some(mut pipe) = child.stdin.take() {
                    pipe.write_all(input).await?;
                    pipe.flush().await?;
                    // Dropping the pipe closes the child's stdin.
                }
            }
            child.wait_with_output().await
        };

        match timeout(self.timeout, interaction).await {
            Ok(Ok(output)) => {
                let out = ShellOutput {
                    status: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                debug!(program = %self.program, status = ?out.status, "shell finished");
                Ok(out)
            }
            Ok(Err(e)) => Err(ShellError::Io(e)),
            Err(_) => Err(ShellError::TimedOut(self.timeout)),
        }
    }
}

#[async_trait]
impl ElevatedShell for ProcessShell {
    async fn run(&self, command: &str) -> Result<ShellOutput, ShellError> {
        debug!(program = %self.program, command, "running shell command");
        self.run_child(&["-c", command], None).await
    }

    async fn probe(&self) -> Result<bool, ShellError> {
        let output = self.run_child(&[], Some(b"exit\n")).await?;
        Ok(output.success())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

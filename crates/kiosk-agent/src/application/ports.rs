//! Ports: the traits through which the application layer reaches the device.
//!
//! Infrastructure implementations live in `crate::infrastructure::platform`
//! and `crate::infrastructure::shell`; tests use the simulated device or the
//! `mockall`-generated mocks.
//!
//! The raw ports return `Result`s.  Turning a failed query into an answer is
//! *not* their job: that policy belongs to `PrivilegeOracle` (fail closed)
//! and `LockStateMonitor` (fail open).

use std::time::Duration;

use async_trait::async_trait;
use kiosk_core::domain::Notice;
use kiosk_core::LockTaskModeState;
use thiserror::Error;

/// Failure reported by a device-policy or lock-task port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform refused the command (e.g. a security exception).
    #[error("rejected by platform: {0}")]
    Rejected(String),

    /// The platform service could not be reached.
    #[error("platform service unavailable: {0}")]
    Unavailable(String),

    /// The platform answered with something that could not be interpreted.
    #[error("unexpected platform output: {0}")]
    UnexpectedOutput(String),

    /// The backend has no way to perform this operation.
    #[error("operation not supported by this backend: {0}")]
    Unsupported(&'static str),
}

/// The device-management authority.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DevicePolicy: Send + Sync {
    /// Whether `package` is currently the device owner.
    async fn is_device_owner(&self, package: &str) -> Result<bool, PlatformError>;

    /// Restricts lock-task mode to `packages`, on behalf of `admin_component`.
    async fn set_lock_task_packages(
        &self,
        admin_component: &str,
        packages: &[String],
    ) -> Result<(), PlatformError>;
}

/// The activity manager / window manager side of lock-task mode.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockTaskPlatform: Send + Sync {
    /// The platform's current lock-task mode.
    async fn lock_task_mode_state(&self) -> Result<LockTaskModeState, PlatformError>;

    /// Enters lock-task mode for the running application.
    async fn start_lock_task(&self) -> Result<(), PlatformError>;

    /// Leaves lock-task mode.
    async fn stop_lock_task(&self) -> Result<(), PlatformError>;

    /// Re-launches the application into the foreground.
    async fn bring_to_front(&self) -> Result<(), PlatformError>;

    /// Sets or clears the secure-window flag (blocks screenshots and
    /// screen recording).
    async fn set_secure_window(&self, secure: bool) -> Result<(), PlatformError>;
}

/// What a finished shell command reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShellOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    /// `true` when the process exited with status 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Failure to obtain a [`ShellOutput`] at all.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The shell binary does not exist on this device.
    #[error("shell binary not found: {0}")]
    NotFound(String),

    /// The process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the child failed.
    #[error("I/O error talking to shell: {0}")]
    Io(#[from] std::io::Error),

    /// The child did not finish within the bounded wait and was killed.
    #[error("shell did not finish within {0:?}")]
    TimedOut(Duration),
}

/// An out-of-band execution context, typically the `su` binary.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElevatedShell: Send + Sync {
    /// Runs `command` inside the context and waits (bounded) for it to finish.
    async fn run(&self, command: &str) -> Result<ShellOutput, ShellError>;

    /// Starts the context, asks it to `exit`, and reports whether it exited
    /// cleanly.
    async fn probe(&self) -> Result<bool, ShellError>;
}

/// Operator-visible diagnostics ("toasts").
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

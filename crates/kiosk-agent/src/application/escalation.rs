//! DeviceOwnerProvisioner: one-time device-owner registration.
//!
//! Registration is delegated to an out-of-band elevated execution context
//! (usually `su`) that runs the device-policy tool:
//!
//! ```text
//! su -c "dpm set-device-owner com.example.showcase/.DeviceAdminReceiver"
//! ```
//!
//! The shell itself enforces a bounded wait, so a hung `su` prompt can never
//! block the control surface indefinitely.
//!
//! | Shell result                  | Outcome                                 |
//! |-------------------------------|-----------------------------------------|
//! | exit status 0                 | `Ok(())`                                |
//! | non-zero exit / killed        | `KioskError::PlatformCommandFailed`     |
//! | missing, spawn error, timeout | `KioskError::AuthorityUnreachable`      |
//!
//! Repeating a registration is assumed harmless but is not atomic.

use std::sync::Arc;

use kiosk_core::{AppIdentity, KioskError};
use tracing::{debug, info};

use crate::application::ports::ElevatedShell;

pub struct DeviceOwnerProvisioner {
    shell: Arc<dyn ElevatedShell>,
    identity: AppIdentity,
}

impl DeviceOwnerProvisioner {
    pub fn new(shell: Arc<dyn ElevatedShell>, identity: AppIdentity) -> Self {
        Self { shell, identity }
    }

    /// The command handed to the elevated context.
    pub fn registration_command(&self) -> String {
        format!("dpm set-device-owner {}", self.identity.admin_component())
    }

    /// Registers the application as device owner.
    ///
    /// # Errors
    ///
    /// See the table in the module documentation.
    pub async fn grant_device_ownership(&self) -> Result<(), KioskError> {
        let command = self.registration_command();
        let output = self
            .shell
            .run(&command)
            .await
            .map_err(|e| KioskError::AuthorityUnreachable {
                reason: e.to_string(),
            })?;

        if !output.success() {
            let detail = output.stderr.trim();
            return Err(KioskError::platform(
                "set_device_owner",
                match output.status {
                    Some(code) => format!("exit code {code}: {detail}"),
                    None => format!("terminated by signal: {detail}"),
                },
            ));
        }

        info!(component = %self.identity.admin_component(), "device owner registered");
        Ok(())
    }

    /// Whether the elevated context can run a trivial command.  Fails closed.
    pub async fn has_elevated_shell_access(&self) -> bool {
        match self.shell.probe().await {
            Ok(ok) => ok,
            Err(e) => {
                debug!("elevated shell probe failed: {e}");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockElevatedShell, ShellError, ShellOutput};
    use std::time::Duration;

    fn provisioner(shell: MockElevatedShell) -> DeviceOwnerProvisioner {
        DeviceOwnerProvisioner::new(Arc::new(shell), AppIdentity::new("com.example.showcase"))
    }

    #[tokio::test]
    async fn test_registration_runs_dpm_with_admin_component() {
        // Arrange
        let mut shell = MockElevatedShell::new();
        shell
            .expect_run()
            .withf(|cmd: &str| {
                cmd == "dpm set-device-owner com.example.showcase/.DeviceAdminReceiver"
            })
            .times(1)
            .returning(|_| {
                Ok(ShellOutput {
                    status: Some(0),
                    ..Default::default()
                })
            });

        // Act
        let result = provisioner(shell).grant_device_ownership().await;

        // Assert
        assert_eq!(result, Ok(()));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_platform_failure() {
        let mut shell = MockElevatedShell::new();
        shell.expect_run().returning(|_| {
            Ok(ShellOutput {
                status: Some(255),
                stdout: String::new(),
                stderr: "Not allowed to set the device owner because there are already some accounts on the device\n".into(),
            })
        });

        let err = provisioner(shell).grant_device_ownership().await.unwrap_err();

        assert_eq!(err.kind(), "platform_command_failed");
        assert!(err.to_string().contains("exit code 255"));
    }

    #[tokio::test]
    async fn test_timeout_is_authority_unreachable() {
        let mut shell = MockElevatedShell::new();
        shell
            .expect_run()
            .returning(|_| Err(ShellError::TimedOut(Duration::from_secs(30))));

        let err = provisioner(shell).grant_device_ownership().await.unwrap_err();

        assert_eq!(err.kind(), "authority_unreachable");
    }

    #[tokio::test]
    async fn test_probe_error_fails_closed() {
        let mut shell = MockElevatedShell::new();
        shell
            .expect_probe()
            .returning(|| Err(ShellError::NotFound("su".into())));

        assert!(!provisioner(shell).has_elevated_shell_access().await);
    }
}

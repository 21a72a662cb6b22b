//! In-process model of the device-management authority and lock-task mode.
//!
//! [`SimulatedDevice`] implements both [`DevicePolicy`] and
//! [`LockTaskPlatform`], so one `Arc<SimulatedDevice>` can stand behind both
//! ports.  It follows the platform rules that matter to the controller:
//!
//! - Only the device owner may set the lock-task allowlist.
//! - Starting lock-task mode for an allowlisted package gives a full lock
//!   (`Locked`); for anything else it falls back to screen pinning (`Pinned`).
//! - Ownership can be revoked and lock-task mode can end "from outside"
//!   ([`SimulatedDevice::revoke_device_owner`],
//!   [`SimulatedDevice::force_exit_lock_task`]), which is what reconciliation
//!   has to cope with.
//!
//! Every state-changing command is appended to a log so tests can assert
//! exactly which platform calls were made.  `fail_queries` / `fail_commands`
//! make the device answer with [`PlatformError::Unavailable`].
//!
//! [`SimulatedShell`] is the matching elevated context: running
//! `dpm set-device-owner <admin>` on it grants ownership on the linked device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use kiosk_core::LockTaskModeState;
use tracing::debug;

use crate::application::ports::{
    DevicePolicy, ElevatedShell, LockTaskPlatform, PlatformError, ShellError, ShellOutput,
};

/// A state-changing call recorded by [`SimulatedDevice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    SetLockTaskPackages(Vec<String>),
    StartLockTask,
    StopLockTask,
    BringToFront,
    SetSecureWindow(bool),
}

#[derive(Debug, Default)]
struct DeviceState {
    device_owner: Option<String>,
    lock_task_packages: Vec<String>,
    mode: LockTaskModeState,
    secure_window: bool,
    commands: Vec<DeviceCommand>,
}

#[derive(Debug)]
pub struct SimulatedDevice {
    /// The application running in the foreground.
    package: String,
    state: Mutex<DeviceState>,
    fail_queries: AtomicBool,
    fail_commands: AtomicBool,
}

impl SimulatedDevice {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            state: Mutex::new(DeviceState::default()),
            fail_queries: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
        }
    }

    /// A device on which `package` is already the device owner.
    pub fn owned_by(package: impl Into<String>) -> Self {
        let package = package.into();
        let device = Self::new(package.clone());
        device.grant_device_owner(&package);
        device
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Test / operator controls ──────────────────────────────────────────────

    pub fn grant_device_owner(&self, package: &str) {
        self.state().device_owner = Some(package.to_string());
    }

    /// Removes the device owner.  Lock-task mode is left as it was; noticing
    /// the mismatch is the controller's job.
    pub fn revoke_device_owner(&self) {
        let mut state = self.state();
        state.device_owner = None;
        state.lock_task_packages.clear();
    }

    /// Ends lock-task mode without going through the agent.
    pub fn force_exit_lock_task(&self) {
        self.state().mode = LockTaskModeState::None;
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> LockTaskModeState {
        self.state().mode
    }

    pub fn device_owner(&self) -> Option<String> {
        self.state().device_owner.clone()
    }

    pub fn lock_task_packages(&self) -> Vec<String> {
        self.state().lock_task_packages.clone()
    }

    pub fn secure_window(&self) -> bool {
        self.state().secure_window
    }

    /// All state-changing commands issued so far, oldest first.
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state().commands.clone()
    }

    fn check_query(&self) -> Result<(), PlatformError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("simulated query failure".into()));
        }
        Ok(())
    }

    fn check_command(&self) -> Result<(), PlatformError> {
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(PlatformError::Unavailable("simulated command failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DevicePolicy for SimulatedDevice {
    async fn is_device_owner(&self, package: &str) -> Result<bool, PlatformError> {
        self.check_query()?;
        Ok(self.state().device_owner.as_deref() == Some(package))
    }

    async fn set_lock_task_packages(
        &self,
        admin_component: &str,
        packages: &[String],
    ) -> Result<(), PlatformError> {
        self.check_command()?;
        let admin_package = admin_component.split('/').next().unwrap_or_default();
        let mut state = self.state();
        if state.device_owner.as_deref() != Some(admin_package) {
            return Err(PlatformError::Rejected(format!(
                "{admin_component} is not the device owner"
            )));
        }
        state.lock_task_packages = packages.to_vec();
        state
            .commands
            .push(DeviceCommand::SetLockTaskPackages(packages.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl LockTaskPlatform for SimulatedDevice {
    async fn lock_task_mode_state(&self) -> Result<LockTaskModeState, PlatformError> {
        self.check_query()?;
        Ok(self.state().mode)
    }

    async fn start_lock_task(&self) -> Result<(), PlatformError> {
        self.check_command()?;
        let mut state = self.state();
        state.mode = if state.lock_task_packages.contains(&self.package) {
            LockTaskModeState::Locked
        } else {
            LockTaskModeState::Pinned
        };
        state.commands.push(DeviceCommand::StartLockTask);
        debug!(mode = ?state.mode, "simulated lock task started");
        Ok(())
    }

    async fn stop_lock_task(&self) -> Result<(), PlatformError> {
        self.check_command()?;
        let mut state = self.state();
        state.mode = LockTaskModeState::None;
        state.commands.push(DeviceCommand::StopLockTask);
        Ok(())
    }

    async fn bring_to_front(&self) -> Result<(), PlatformError> {
        self.check_command()?;
        self.state().commands.push(DeviceCommand::BringToFront);
        Ok(())
    }

    async fn set_secure_window(&self, secure: bool) -> Result<(), PlatformError> {
        self.check_command()?;
        let mut state = self.state();
        state.secure_window = secure;
        state.commands.push(DeviceCommand::SetSecureWindow(secure));
        Ok(())
    }
}

// ── SimulatedShell ────────────────────────────────────────────────────────────

const SET_DEVICE_OWNER: &str = "dpm set-device-owner ";

/// Elevated context attached to a [`SimulatedDevice`].
#[derive(Debug)]
pub struct SimulatedShell {
    device: Arc<SimulatedDevice>,
    reachable: AtomicBool,
    history: Mutex<Vec<String>>,
}

impl SimulatedShell {
    pub fn new(device: Arc<SimulatedDevice>) -> Self {
        Self {
            device,
            reachable: AtomicBool::new(true),
            history: Mutex::new(Vec::new()),
        }
    }

    /// A context whose binary is missing, like a device without `su`.
    pub fn unreachable(device: Arc<SimulatedDevice>) -> Self {
        let shell = Self::new(device);
        shell.set_reachable(false);
        shell
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Command lines run so far.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_reachable(&self) -> Result<(), ShellError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ShellError::NotFound("su".into()))
        }
    }
}

#[async_trait]
impl ElevatedShell for SimulatedShell {
    async fn run(&self, command: &str) -> Result<ShellOutput, ShellError> {
        self.check_reachable()?;
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.to_string());

        let Some(component) = command.strip_prefix(SET_DEVICE_OWNER) else {
            return Ok(ShellOutput {
                status: Some(127),
                stdout: String::new(),
                stderr: format!("{command}: not found"),
            });
        };

        let package = component.trim().split('/').next().unwrap_or_default();
        match self.device.device_owner() {
            Some(owner) if owner != package => Ok(ShellOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "Not allowed to set the device owner because there is already a device owner"
                    .into(),
            }),
            _ => {
                self.device.grant_device_owner(package);
                Ok(ShellOutput {
                    status: Some(0),
                    stdout: format!("Success: Device owner set to package {component}\n"),
                    stderr: String::new(),
                })
            }
        }
    }

    async fn probe(&self) -> Result<bool, ShellError> {
        self.check_reachable()?;
        Ok(true)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = "com.example.showcase";

    #[tokio::test]
    async fn test_allowlist_requires_device_owner() {
        // Arrange
        let device = SimulatedDevice::new(PKG);

        // Act
        let result = device
            .set_lock_task_packages("com.example.showcase/.DeviceAdminReceiver", &[PKG.into()])
            .await;

        // Assert
        assert!(matches!(result, Err(PlatformError::Rejected(_))));
        assert!(device.commands().is_empty());
    }

    #[tokio::test]
    async fn test_start_without_allowlist_pins_screen() {
        let device = SimulatedDevice::new(PKG);
        device.start_lock_task().await.unwrap();
        assert_eq!(device.mode(), LockTaskModeState::Pinned);
    }

    #[tokio::test]
    async fn test_owner_allowlist_then_start_locks() {
        // Arrange
        let device = SimulatedDevice::owned_by(PKG);

        // Act
        device
            .set_lock_task_packages("com.example.showcase/.DeviceAdminReceiver", &[PKG.into()])
            .await
            .unwrap();
        device.start_lock_task().await.unwrap();

        // Assert
        assert_eq!(device.mode(), LockTaskModeState::Locked);
        assert_eq!(
            device.commands(),
            vec![
                DeviceCommand::SetLockTaskPackages(vec![PKG.into()]),
                DeviceCommand::StartLockTask,
            ]
        );
    }

    #[tokio::test]
    async fn test_query_failure_flag() {
        let device = SimulatedDevice::owned_by(PKG);
        device.set_fail_queries(true);
        assert!(device.is_device_owner(PKG).await.is_err());
        assert!(device.lock_task_mode_state().await.is_err());
    }

    #[tokio::test]
    async fn test_shell_grants_device_owner() {
        // Arrange
        let device = Arc::new(SimulatedDevice::new(PKG));
        let shell = SimulatedShell::new(Arc::clone(&device));

        // Act
        let out = shell
            .run("dpm set-device-owner com.example.showcase/.DeviceAdminReceiver")
            .await
            .unwrap();

        // Assert
        assert!(out.success());
        assert_eq!(device.device_owner().as_deref(), Some(PKG));
        assert_eq!(shell.history().len(), 1);
    }

    #[tokio::test]
    async fn test_shell_refuses_second_owner() {
        let device = Arc::new(SimulatedDevice::owned_by("org.other.app"));
        let shell = SimulatedShell::new(Arc::clone(&device));

        let out = shell
            .run("dpm set-device-owner com.example.showcase/.DeviceAdminReceiver")
            .await
            .unwrap();

        assert_eq!(out.status, Some(1));
        assert_eq!(device.device_owner().as_deref(), Some("org.other.app"));
    }

    #[tokio::test]
    async fn test_unreachable_shell_reports_not_found() {
        let device = Arc::new(SimulatedDevice::new(PKG));
        let shell = SimulatedShell::unreachable(device);

        assert!(matches!(shell.probe().await, Err(ShellError::NotFound(_))));
        assert!(shell.run("id").await.is_err());
    }
}

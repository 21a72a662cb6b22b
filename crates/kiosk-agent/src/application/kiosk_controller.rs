//! KioskController: the privilege-gated lock-task state machine.
//!
//! # Two axes (for beginners)
//!
//! The controller's world is the product of two independent facts:
//!
//! ```text
//!                  Unprivileged                 Privileged
//!            ┌──────────────────────────┬──────────────────────────┐
//!  Unlocked  │ initial; enable fails    │ enable may succeed       │
//!            ├──────────────────────────┼──────────────────────────┤
//!  Locked    │ ILLEGAL: privilege was   │ disable succeeds; app    │
//!            │ revoked while locked;    │ resists exit             │
//!            │ reconcile forces unlock  │                          │
//!            └──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Privilege is always re-queried through [`PrivilegeOracle`].  The lock axis
//! has two readings: the controller's own [`IntendedLockState`] (what it last
//! commanded) and the platform's [`ObservedLockState`] via
//! [`LockStateMonitor`].  Every "are we locked right now?" decision uses the
//! observed state.
//!
//! # Serialization
//!
//! `IntendedLockState` lives behind a `tokio::sync::Mutex`.  Operations that
//! may change it (`enable`, `disable`, `reconcile`) hold the guard for their
//! whole duration, so two concurrent requests can never interleave their
//! platform commands and leave the flag contradicting what was commanded.
//! The guard is async-aware, so waiting for it suspends the session task
//! instead of blocking a runtime thread.

use std::sync::Arc;

use kiosk_core::{
    AppIdentity, IntendedLockState, KioskError, ObservedLockState, PermissionSnapshot, Transition,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::escalation::DeviceOwnerProvisioner;
use crate::application::lock_monitor::LockStateMonitor;
use crate::application::ports::{DevicePolicy, LockTaskPlatform};
use crate::application::privilege_oracle::PrivilegeOracle;

/// What [`KioskController::reconcile`] found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Intent and observation agree.
    InSync,
    /// The platform is locked for a privileged app, but the intent said
    /// unlocked (e.g. after a process restart).  Intent adopted `Locked`.
    Adopted,
    /// The platform left lock mode on its own.  Intent reset to `Unlocked`.
    Drifted,
    /// Locked while unprivileged: the lock was released.
    ForcedUnlock,
    /// Locked while unprivileged, and releasing the lock failed.  Intent is
    /// still reset to `Unlocked`.
    ForcedUnlockFailed(KioskError),
}

pub struct KioskController {
    identity: AppIdentity,
    oracle: PrivilegeOracle,
    monitor: LockStateMonitor,
    policy: Arc<dyn DevicePolicy>,
    platform: Arc<dyn LockTaskPlatform>,
    provisioner: Arc<DeviceOwnerProvisioner>,
    intended: Mutex<IntendedLockState>,
}

impl KioskController {
    /// Creates a controller in the initial `Unlocked` intent.
    ///
    /// Call [`reconcile`](Self::reconcile) before trusting the intent in a
    /// process that may have been restarted while the device was locked.
    pub fn new(
        identity: AppIdentity,
        policy: Arc<dyn DevicePolicy>,
        platform: Arc<dyn LockTaskPlatform>,
        provisioner: Arc<DeviceOwnerProvisioner>,
    ) -> Self {
        Self {
            oracle: PrivilegeOracle::new(Arc::clone(&policy), identity.package.clone()),
            monitor: LockStateMonitor::new(Arc::clone(&platform)),
            identity,
            policy,
            platform,
            provisioner,
            intended: Mutex::new(IntendedLockState::Unlocked),
        }
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn oracle(&self) -> &PrivilegeOracle {
        &self.oracle
    }

    pub fn monitor(&self) -> &LockStateMonitor {
        &self.monitor
    }

    pub fn provisioner(&self) -> &Arc<DeviceOwnerProvisioner> {
        &self.provisioner
    }

    /// The controller's command log.  Not an answer to "are we locked?".
    pub async fn intended(&self) -> IntendedLockState {
        *self.intended.lock().await
    }

    /// Pins this package and enters lock-task mode.
    ///
    /// The intent only advances to `Locked` after both platform commands
    /// succeeded; a failure after the privilege check leaves it untouched.
    ///
    /// # Errors
    ///
    /// - [`KioskError::PrivilegeDenied`] when not device owner (no platform
    ///   command is issued).
    /// - [`KioskError::PlatformCommandFailed`] when pinning or starting the
    ///   lock task fails.
    pub async fn enable(&self) -> Result<Transition, KioskError> {
        let mut intended = self.intended.lock().await;

        if !self.oracle.is_privileged().await {
            return Err(KioskError::PrivilegeDenied);
        }

        let packages = [self.identity.package.clone()];
        self.policy
            .set_lock_task_packages(&self.identity.admin_component(), &packages)
            .await
            .map_err(|e| KioskError::platform("set_lock_task_packages", e))?;

        self.platform
            .start_lock_task()
            .await
            .map_err(|e| KioskError::platform("start_lock_task", e))?;

        *intended = IntendedLockState::Locked;
        info!(package = %self.identity.package, "lock task mode enabled");
        Ok(Transition::Applied)
    }

    /// Leaves lock-task mode if the platform says it is active.
    ///
    /// Already unlocked is success and issues no platform command.
    ///
    /// # Errors
    ///
    /// [`KioskError::PlatformCommandFailed`] when stopping the lock task fails.
    pub async fn disable(&self) -> Result<Transition, KioskError> {
        let mut intended = self.intended.lock().await;

        if !self.monitor.is_locked().await {
            if intended.is_locked() {
                debug!("intent was locked but platform is not; clearing intent");
            }
            *intended = IntendedLockState::Unlocked;
            warn!("lock task mode already disabled");
            return Ok(Transition::AlreadyInTargetState);
        }

        self.platform
            .stop_lock_task()
            .await
            .map_err(|e| KioskError::platform("stop_lock_task", e))?;

        *intended = IntendedLockState::Unlocked;
        info!("lock task mode disabled");
        Ok(Transition::Applied)
    }

    /// The live platform lock state, never the cached intent.
    pub async fn status(&self) -> bool {
        self.monitor.is_locked().await
    }

    /// Fresh aggregate of privilege, lock and elevated-shell answers.
    pub async fn permission_snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot {
            is_privileged: self.oracle.is_privileged().await,
            is_locked: self.status().await,
            has_elevated_shell_access: self.provisioner.has_elevated_shell_access().await,
        }
    }

    /// Re-synchronizes the intent with the platform and enforces the
    /// "never locked while unprivileged" invariant.
    pub async fn reconcile(&self) -> Reconciliation {
        let mut intended = self.intended.lock().await;
        let observed = self.monitor.observed().await;

        match observed {
            ObservedLockState::Locked => {
                if !self.oracle.is_privileged().await {
                    error!("device is locked but the app is no longer device owner; forcing unlock");
                    *intended = IntendedLockState::Unlocked;
                    return match self.platform.stop_lock_task().await {
                        Ok(()) => Reconciliation::ForcedUnlock,
                        Err(e) => {
                            error!("forced unlock failed: {e}");
                            Reconciliation::ForcedUnlockFailed(KioskError::platform(
                                "stop_lock_task",
                                e,
                            ))
                        }
                    };
                }
                if intended.is_locked() {
                    Reconciliation::InSync
                } else {
                    info!("adopting lock task mode already active on the platform");
                    *intended = IntendedLockState::Locked;
                    Reconciliation::Adopted
                }
            }
            ObservedLockState::Unlocked => {
                if intended.is_locked() {
                    warn!("platform left lock task mode on its own");
                    *intended = IntendedLockState::Unlocked;
                    Reconciliation::Drifted
                } else {
                    Reconciliation::InSync
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

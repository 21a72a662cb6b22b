//! LockStateMonitor: the platform's own answer to "are we locked?"
//!
//! # Failure policy: fail open
//!
//! If the lock-task query fails, the monitor answers "not locked".  A broken
//! monitor must never leave the UI permanently convinced it is locked (keys
//! swallowed, app re-launched on every stop) with no way out.  This is the
//! opposite of `PrivilegeOracle`, which fails closed, and the asymmetry is
//! intentional.

use std::sync::Arc;

use kiosk_core::ObservedLockState;
use tracing::warn;

use crate::application::ports::LockTaskPlatform;

/// Samples the platform lock-task state on demand.  Never caches.
#[derive(Clone)]
pub struct LockStateMonitor {
    platform: Arc<dyn LockTaskPlatform>,
}

impl LockStateMonitor {
    pub fn new(platform: Arc<dyn LockTaskPlatform>) -> Self {
        Self { platform }
    }

    /// Queries the platform; any query failure yields `false`.
    pub async fn is_locked(&self) -> bool {
        match self.platform.lock_task_mode_state().await {
            Ok(mode) => mode.is_active(),
            Err(e) => {
                warn!("lock-task state query failed, treating as unlocked: {e}");
                false
            }
        }
    }

    pub async fn observed(&self) -> ObservedLockState {
        ObservedLockState::from_bool(self.is_locked().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockLockTaskPlatform, PlatformError};
    use kiosk_core::LockTaskModeState;

    #[tokio::test]
    async fn test_pinned_and_locked_both_report_locked() {
        for mode in [LockTaskModeState::Locked, LockTaskModeState::Pinned] {
            let mut platform = MockLockTaskPlatform::new();
            platform
                .expect_lock_task_mode_state()
                .returning(move || Ok(mode));

            let monitor = LockStateMonitor::new(Arc::new(platform));

            assert!(monitor.is_locked().await, "{mode:?} must count as locked");
        }
    }

    #[tokio::test]
    async fn test_query_failure_fails_open() {
        let mut platform = MockLockTaskPlatform::new();
        platform
            .expect_lock_task_mode_state()
            .returning(|| Err(PlatformError::Unavailable("activity manager gone".into())));

        let monitor = LockStateMonitor::new(Arc::new(platform));

        assert_eq!(monitor.observed().await, ObservedLockState::Unlocked);
    }

    #[test]
    fn test_no_lock_task_reports_unlocked() {
        let mut platform = MockLockTaskPlatform::new();
        platform
            .expect_lock_task_mode_state()
            .returning(|| Ok(LockTaskModeState::None));
        let monitor = LockStateMonitor::new(Arc::new(platform));

        let observed = tokio_test::block_on(monitor.observed());

        assert_eq!(observed, ObservedLockState::Unlocked);
    }
}

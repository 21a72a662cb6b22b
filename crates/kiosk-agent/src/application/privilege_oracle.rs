//! PrivilegeOracle: "is this application the device owner right now?"
//!
//! # Failure policy: fail closed
//!
//! If the device-policy query itself fails, the oracle answers `false`.
//! Absence of proof of privilege is absence of privilege; an enable request
//! made while the authority is unreachable must be declined.
//!
//! Compare `LockStateMonitor`, which maps its own failures the same way
//! (`false`) but for the opposite reason.  The two are kept as separate
//! functions so neither policy can be changed by accident through a shared
//! helper.

use std::sync::Arc;

use kiosk_core::PrivilegeState;
use tracing::{debug, warn};

use crate::application::ports::DevicePolicy;

/// Answers privilege queries for one package.  Never caches.
#[derive(Clone)]
pub struct PrivilegeOracle {
    policy: Arc<dyn DevicePolicy>,
    package: String,
}

impl PrivilegeOracle {
    pub fn new(policy: Arc<dyn DevicePolicy>, package: impl Into<String>) -> Self {
        Self {
            policy,
            package: package.into(),
        }
    }

    /// Queries the authority; any query failure yields `false`.
    pub async fn is_privileged(&self) -> bool {
        match self.policy.is_device_owner(&self.package).await {
            Ok(owner) => {
                debug!(package = %self.package, owner, "device-owner query");
                owner
            }
            Err(e) => {
                warn!(package = %self.package, "device-owner query failed, treating as unprivileged: {e}");
                false
            }
        }
    }

    pub async fn privilege_state(&self) -> PrivilegeState {
        PrivilegeState::from_bool(self.is_privileged().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockDevicePolicy, PlatformError};

    fn oracle_with(policy: MockDevicePolicy) -> PrivilegeOracle {
        PrivilegeOracle::new(Arc::new(policy), "com.example.showcase")
    }

    #[tokio::test]
    async fn test_owner_answer_is_passed_through() {
        // Arrange
        let mut policy = MockDevicePolicy::new();
        policy.expect_is_device_owner().returning(|_| Ok(true));

        // Act / Assert
        let oracle = oracle_with(policy);
        assert!(oracle.is_privileged().await);
        assert_eq!(oracle.privilege_state().await, PrivilegeState::Privileged);
    }

    #[tokio::test]
    async fn test_query_failure_fails_closed() {
        let mut policy = MockDevicePolicy::new();
        policy
            .expect_is_device_owner()
            .returning(|_| Err(PlatformError::Unavailable("policy service died".into())));

        let oracle = oracle_with(policy);

        assert!(!oracle.is_privileged().await);
    }

    #[tokio::test]
    async fn test_every_call_requeries_the_authority() {
        // Privilege can be revoked at any time, so nothing may be cached.
        let mut policy = MockDevicePolicy::new();
        let mut seq = mockall::Sequence::new();
        policy
            .expect_is_device_owner()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        policy
            .expect_is_device_owner()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));

        let oracle = oracle_with(policy);

        assert!(oracle.is_privileged().await);
        assert!(!oracle.is_privileged().await);
    }
}

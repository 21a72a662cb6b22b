//! Error taxonomy of the kiosk controller.
//!
//! Every failure the controller can meet is one of three kinds.  "Already in
//! the target state" is deliberately *not* an error; it is the
//! [`Transition::AlreadyInTargetState`] success variant.
//!
//! None of these types crosses the control surface: the surface collapses
//! `Result<Transition, KioskError>` to a plain `bool` and reports the detail
//! through logs and the notification sink only.

use thiserror::Error;

/// The successful outcome of a lock or unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Platform commands were issued and the intended state advanced.
    Applied,
    /// Nothing to do; the platform already was in the requested state.
    AlreadyInTargetState,
}

/// Why a kiosk operation did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KioskError {
    /// Enable was attempted without the device-owner privilege.
    #[error("application is not the device owner")]
    PrivilegeDenied,

    /// A lock, unlock, pinning or registration command failed or returned
    /// a non-zero status.
    #[error("platform command '{operation}' failed: {reason}")]
    PlatformCommandFailed {
        operation: &'static str,
        reason: String,
    },

    /// The elevated execution context is absent or did not respond in time.
    #[error("elevated authority unreachable: {reason}")]
    AuthorityUnreachable { reason: String },
}

impl KioskError {
    /// Shorthand for building a [`KioskError::PlatformCommandFailed`].
    pub fn platform(operation: &'static str, reason: impl ToString) -> Self {
        Self::PlatformCommandFailed {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PrivilegeDenied => "privilege_denied",
            Self::PlatformCommandFailed { .. } => "platform_command_failed",
            Self::AuthorityUnreachable { .. } => "authority_unreachable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_message_names_operation() {
        let err = KioskError::platform("start_lock_task", "denied by policy");
        assert_eq!(
            err.to_string(),
            "platform command 'start_lock_task' failed: denied by policy"
        );
        assert_eq!(err.kind(), "platform_command_failed");
    }

    #[test]
    fn test_kind_is_distinct_per_variant() {
        let unreachable = KioskError::AuthorityUnreachable {
            reason: "su not found".into(),
        };
        assert_eq!(KioskError::PrivilegeDenied.kind(), "privilege_denied");
        assert_eq!(unreachable.kind(), "authority_unreachable");
    }
}

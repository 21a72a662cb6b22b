//! Privilege and lock-state vocabulary.
//!
//! # Two lock states, not one
//!
//! The kiosk controller keeps its own record of what it last commanded
//! ([`IntendedLockState`]), but the platform is the only authority on whether
//! the device is actually locked ([`ObservedLockState`]).  The two can drift
//! apart, for example when the platform forcibly exits lock mode.  Keeping them
//! as separate types makes it a compile-time error to answer "are we locked?"
//! from the controller's own bookkeeping by accident.
//!
//! ```text
//!   enable() / disable()          LockStateMonitor
//!          │                             │
//!          ▼                             ▼
//!  IntendedLockState  ◄── reconcile ── ObservedLockState  (ground truth)
//! ```

use serde::{Deserialize, Serialize};

/// Whether the running application holds the device-owner privilege.
///
/// Always derived on demand from the platform authority; never cached,
/// because privilege can be revoked externally at any moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivilegeState {
    Unprivileged,
    Privileged,
}

impl PrivilegeState {
    /// Converts the boolean answer of a privilege query into a state.
    pub fn from_bool(privileged: bool) -> Self {
        if privileged {
            Self::Privileged
        } else {
            Self::Unprivileged
        }
    }

    /// Returns `true` for [`PrivilegeState::Privileged`].
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Privileged)
    }
}

/// What the kiosk controller last commanded.
///
/// Owned exclusively by the controller.  A freshly started process always
/// begins at [`IntendedLockState::Unlocked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntendedLockState {
    #[default]
    Unlocked,
    Locked,
}

impl IntendedLockState {
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// The platform's authoritative lock-task state, sampled at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObservedLockState {
    Unlocked,
    Locked,
}

impl ObservedLockState {
    /// Converts the boolean answer of a lock query into a state.
    pub fn from_bool(locked: bool) -> Self {
        if locked {
            Self::Locked
        } else {
            Self::Unlocked
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// Raw lock-task mode reported by the platform's activity manager.
///
/// `Pinned` is the user-initiated screen-pinning flavour of lock task.  Both
/// `Locked` and `Pinned` count as "the device is locked".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockTaskModeState {
    #[default]
    None,
    Locked,
    Pinned,
}

impl LockTaskModeState {
    /// Returns `true` unless the platform reports no lock task at all.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Parses the token printed by the platform (`NONE`, `LOCKED`, `PINNED`).
    ///
    /// Matching is case-insensitive; surrounding whitespace is ignored.
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "LOCKED" => Some(Self::Locked),
            "PINNED" => Some(Self::Pinned),
            _ => None,
        }
    }
}

impl From<LockTaskModeState> for ObservedLockState {
    fn from(mode: LockTaskModeState) -> Self {
        Self::from_bool(mode.is_active())
    }
}

/// A fresh, unpersisted aggregate of the three permission answers.
///
/// Serialized with the field names the host expects on the control channel:
///
/// ```json
/// {"isDeviceOwner":true,"isInLockTaskMode":false,"hasRootAccess":true}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    #[serde(rename = "isDeviceOwner")]
    pub is_privileged: bool,
    #[serde(rename = "isInLockTaskMode")]
    pub is_locked: bool,
    #[serde(rename = "hasRootAccess")]
    pub has_elevated_shell_access: bool,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intended_state_defaults_to_unlocked() {
        assert_eq!(IntendedLockState::default(), IntendedLockState::Unlocked);
    }

    #[test]
    fn test_privilege_state_from_bool() {
        assert_eq!(PrivilegeState::from_bool(true), PrivilegeState::Privileged);
        assert_eq!(PrivilegeState::from_bool(false), PrivilegeState::Unprivileged);
        assert!(!PrivilegeState::Unprivileged.is_privileged());
    }

    #[test]
    fn test_pinned_mode_counts_as_locked() {
        // Screen pinning is still a lock task from the user's point of view.
        assert_eq!(
            ObservedLockState::from(LockTaskModeState::Pinned),
            ObservedLockState::Locked
        );
        assert_eq!(
            ObservedLockState::from(LockTaskModeState::None),
            ObservedLockState::Unlocked
        );
    }

    #[test]
    fn test_parse_token_accepts_platform_spellings() {
        assert_eq!(LockTaskModeState::parse_token("LOCKED"), Some(LockTaskModeState::Locked));
        assert_eq!(LockTaskModeState::parse_token(" pinned\n"), Some(LockTaskModeState::Pinned));
        assert_eq!(LockTaskModeState::parse_token("NONE"), Some(LockTaskModeState::None));
        assert_eq!(LockTaskModeState::parse_token("2"), None);
    }

    #[test]
    fn test_permission_snapshot_uses_host_field_names() {
        // Arrange
        let snapshot = PermissionSnapshot {
            is_privileged: true,
            is_locked: false,
            has_elevated_shell_access: true,
        };

        // Act
        let json = serde_json::to_value(snapshot).unwrap();

        // Assert
        assert_eq!(json["isDeviceOwner"], true);
        assert_eq!(json["isInLockTaskMode"], false);
        assert_eq!(json["hasRootAccess"], true);
    }
}

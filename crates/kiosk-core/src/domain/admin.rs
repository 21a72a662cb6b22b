//! Device-admin broadcast events.
//!
//! The platform notifies the application's device-admin receiver when admin
//! rights are granted or revoked and when lock-task mode is entered or left.
//! The host forwards these as `Admin` frames.

use serde::{Deserialize, Serialize};

/// A device-admin callback forwarded by the host.
///
/// ```json
/// {"kind":"lockTaskEntering","package":"com.example.showcase"}
/// {"kind":"disableRequested"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AdminEvent {
    /// Device-admin rights were granted.
    Enabled,
    /// Device-admin rights were revoked.
    Disabled,
    /// The user asked to revoke device-admin rights; the receiver answers
    /// with a warning message.
    DisableRequested,
    /// The platform is entering lock-task mode for `package`.
    LockTaskEntering { package: String },
    /// The platform is leaving lock-task mode.
    LockTaskExiting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_task_entering_carries_package() {
        let json = r#"{"kind":"lockTaskEntering","package":"com.example.showcase"}"#;
        let event: AdminEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            AdminEvent::LockTaskEntering {
                package: "com.example.showcase".into()
            }
        );
    }
}

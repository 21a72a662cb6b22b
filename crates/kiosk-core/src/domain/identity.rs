//! Identity of the application that is pinned in kiosk mode.

use serde::{Deserialize, Serialize};

/// Default device-admin receiver class, relative to the package.
pub const DEFAULT_ADMIN_RECEIVER: &str = ".DeviceAdminReceiver";

/// The package being pinned and the device-admin receiver that holds its
/// management privilege.
///
/// # Example
///
/// ```rust
/// use kiosk_core::AppIdentity;
///
/// let id = AppIdentity::new("com.example.showcase");
/// assert_eq!(id.admin_component(), "com.example.showcase/.DeviceAdminReceiver");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Package name, e.g. `com.example.showcase`.
    pub package: String,
    /// Receiver class name; a leading `.` means "relative to `package`".
    pub admin_receiver: String,
}

impl AppIdentity {
    /// Creates an identity using [`DEFAULT_ADMIN_RECEIVER`].
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            admin_receiver: DEFAULT_ADMIN_RECEIVER.to_string(),
        }
    }

    /// Overrides the receiver class.
    pub fn with_admin_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.admin_receiver = receiver.into();
        self
    }

    /// The flattened component name understood by the device-policy tool:
    /// `<package>/<receiver>`.
    pub fn admin_component(&self) -> String {
        format!("{}/{}", self.package, self.admin_receiver)
    }
}

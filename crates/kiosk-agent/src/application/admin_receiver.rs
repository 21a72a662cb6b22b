//! AdminReceiver: turns device-admin callbacks into operator notices.

use std::sync::Arc;

use kiosk_core::domain::{AdminEvent, Notice};
use kiosk_core::PrivilegeState;
use tracing::info;

use crate::application::ports::NotificationSink;
use crate::application::privilege_oracle::PrivilegeOracle;

/// Warning returned when the user asks to revoke device-admin rights.
pub const DISABLE_REQUEST_WARNING: &str =
    "This application requires device admin rights for kiosk mode to work";

pub struct AdminReceiver {
    oracle: PrivilegeOracle,
    notifier: Arc<dyn NotificationSink>,
}

impl AdminReceiver {
    pub fn new(oracle: PrivilegeOracle, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { oracle, notifier }
    }

    /// Handles one callback, forwards the resulting notice to the sink and
    /// returns it so the host can display it too.
    pub async fn handle(&self, event: AdminEvent) -> Notice {
        info!(?event, "device admin event");
        let notice = match event {
            AdminEvent::Enabled => {
                match self.oracle.privilege_state().await {
                    PrivilegeState::Privileged => Notice::info("Device owner activated"),
                    PrivilegeState::Unprivileged => {
                        Notice::warn("Device admin enabled, but device owner is not active")
                    }
                }
            }
            AdminEvent::Disabled => Notice::info("Device admin deactivated"),
            AdminEvent::DisableRequested => Notice::warn(DISABLE_REQUEST_WARNING),
            AdminEvent::LockTaskEntering { package } => {
                Notice::info(format!("Kiosk mode activated for {package}"))
            }
            AdminEvent::LockTaskExiting => Notice::info("Kiosk mode deactivated"),
        };
        self.notifier.notify(notice.clone());
        notice
    }
}

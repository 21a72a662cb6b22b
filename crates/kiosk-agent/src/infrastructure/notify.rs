//! Notification sinks.
//!
//! - [`TracingNotifier`] – production sink; every notice becomes a `tracing`
//!   event under the `kiosk::notice` target, so operators can filter them with
//!   `RUST_LOG=kiosk::notice=info`.
//! - [`MemoryNotifier`] – keeps notices in memory for tests and for hosts that
//!   poll for them.

use std::sync::{Mutex, PoisonError};

use kiosk_core::domain::{Notice, NoticeLevel};
use tracing::{error, info, warn};

use crate::application::ports::NotificationSink;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(target: "kiosk::notice", "{}", notice.text),
            NoticeLevel::Warn => warn!(target: "kiosk::notice", "{}", notice.text),
            NoticeLevel::Error => error!(target: "kiosk::notice", "{}", notice.text),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything notified so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

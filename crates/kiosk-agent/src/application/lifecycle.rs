//! KioskLifecycle: host activity callbacks while kiosk mode may be active.
//!
//! The host forwards its UI lifecycle events here instead of keeping its own
//! "am I locked" flag.  Every decision reads the platform's observed lock
//! state through the shared [`KioskController`] handle.
//!
//! | Callback        | While locked                               | Otherwise    |
//! |-----------------|--------------------------------------------|--------------|
//! | `on_create`     | set secure-window flag (if configured)     | same         |
//! | `on_key_down`   | consume Back / Home / AppSwitch            | pass through |
//! | `on_back_pressed` | consume                                  | pass through |
//! | `on_pause`      | log the blocked minimize attempt           | nothing      |
//! | `on_stop`       | re-launch the app to the foreground        | nothing      |
//! | `on_resume`     | reconcile intent with the platform         | same         |

use std::sync::Arc;

use kiosk_core::domain::{KeyDisposition, LifecycleEvent, NavigationKey};
use tracing::{debug, info, warn};

use crate::application::kiosk_controller::{KioskController, Reconciliation};
use crate::application::ports::LockTaskPlatform;

pub struct KioskLifecycle {
    controller: Arc<KioskController>,
    platform: Arc<dyn LockTaskPlatform>,
    secure_window: bool,
}

impl KioskLifecycle {
    pub fn new(
        controller: Arc<KioskController>,
        platform: Arc<dyn LockTaskPlatform>,
        secure_window: bool,
    ) -> Self {
        Self {
            controller,
            platform,
            secure_window,
        }
    }

    /// Dispatches a lifecycle event.  Only `BackPressed` yields a disposition.
    pub async fn handle(&self, event: LifecycleEvent) -> Option<KeyDisposition> {
        match event {
            LifecycleEvent::Create => {
                self.on_create().await;
                None
            }
            LifecycleEvent::Resume => {
                self.on_resume().await;
                None
            }
            LifecycleEvent::Pause => {
                self.on_pause().await;
                None
            }
            LifecycleEvent::Stop => {
                self.on_stop().await;
                None
            }
            LifecycleEvent::BackPressed => Some(self.on_back_pressed().await),
        }
    }

    pub async fn on_create(&self) {
        if !self.secure_window {
            return;
        }
        if let Err(e) = self.platform.set_secure_window(true).await {
            warn!("could not set secure window flag: {e}");
        }
    }

    pub async fn on_key_down(&self, key: NavigationKey) -> KeyDisposition {
        if key.is_system_navigation() && self.controller.status().await {
            debug!(?key, "system key blocked in kiosk mode");
            return KeyDisposition::Consumed;
        }
        KeyDisposition::PassThrough
    }

    pub async fn on_back_pressed(&self) -> KeyDisposition {
        if self.controller.status().await {
            debug!("back press blocked in kiosk mode");
            KeyDisposition::Consumed
        } else {
            KeyDisposition::PassThrough
        }
    }

    pub async fn on_pause(&self) {
        if self.controller.status().await {
            info!("attempt to minimize the app blocked");
        }
    }

    /// Re-launches the app when it is stopped while locked.
    ///
    /// Returns `true` if a re-launch was issued.
    pub async fn on_stop(&self) -> bool {
        if !self.controller.status().await {
            return false;
        }
        match self.platform.bring_to_front().await {
            Ok(()) => {
                info!("app stopped while locked; brought back to foreground");
                true
            }
            Err(e) => {
                warn!("failed to bring app back to foreground: {e}");
                false
            }
        }
    }

    pub async fn on_resume(&self) -> Reconciliation {
        self.controller.reconcile().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! ControlSurface: the request/response boundary other processes talk to.
//!
//! This is the only place where the controller's tagged results
//! (`Result<Transition, KioskError>`) are collapsed to a plain `bool`.  The
//! failure kind is written to the log and to the notification sink, never to
//! the reply.
//!
//! ```text
//!   HostToAgent frame
//!         │
//!         ▼
//!   ControlSurface::handle ──► Call      ──► dispatch(method) ──► Reply
//!                          ├─► KeyDown   ──► KioskLifecycle   ──► KeyDisposition
//!                          ├─► Lifecycle ──► KioskLifecycle   ──► (KeyDisposition)
//!                          └─► Admin     ──► AdminReceiver    ──► Notice
//! ```

use std::sync::Arc;

use kiosk_core::domain::{NavigationKey, Notice};
use kiosk_core::{
    AgentToHost, AppIdentity, CallOutcome, HostToAgent, KioskError, Method, PermissionSnapshot,
};
use tracing::{debug, warn};

use crate::application::admin_receiver::AdminReceiver;
use crate::application::escalation::DeviceOwnerProvisioner;
use crate::application::kiosk_controller::KioskController;
use crate::application::lifecycle::KioskLifecycle;
use crate::application::ports::NotificationSink;
use crate::application::DevicePorts;

pub struct ControlSurface {
    controller: Arc<KioskController>,
    lifecycle: KioskLifecycle,
    admin: AdminReceiver,
    notifier: Arc<dyn NotificationSink>,
}

impl ControlSurface {
    pub fn new(
        controller: Arc<KioskController>,
        lifecycle: KioskLifecycle,
        admin: AdminReceiver,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            controller,
            lifecycle,
            admin,
            notifier,
        }
    }

    /// Builds the whole application layer from its ports.
    pub fn assemble(identity: AppIdentity, ports: DevicePorts, secure_window: bool) -> Self {
        let provisioner = Arc::new(DeviceOwnerProvisioner::new(
            Arc::clone(&ports.shell),
            identity.clone(),
        ));
        let controller = Arc::new(KioskController::new(
            identity,
            Arc::clone(&ports.policy),
            Arc::clone(&ports.lock_task),
            provisioner,
        ));
        let lifecycle = KioskLifecycle::new(
            Arc::clone(&controller),
            Arc::clone(&ports.lock_task),
            secure_window,
        );
        let admin = AdminReceiver::new(controller.oracle().clone(), Arc::clone(&ports.notifier));
        Self::new(controller, lifecycle, admin, ports.notifier)
    }

    pub fn controller(&self) -> &Arc<KioskController> {
        &self.controller
    }

    pub fn lifecycle(&self) -> &KioskLifecycle {
        &self.lifecycle
    }

    // ── Frame routing ─────────────────────────────────────────────────────────

    /// Answers one host frame.  `None` means the frame needs no reply.
    pub async fn handle(&self, frame: HostToAgent) -> Option<AgentToHost> {
        match frame {
            HostToAgent::Call { id, method } => Some(AgentToHost::Reply {
                id,
                outcome: self.dispatch(&method).await,
            }),
            HostToAgent::KeyDown { key } => Some(self.key_reply(key).await),
            HostToAgent::Lifecycle { event } => self
                .lifecycle
                .handle(event)
                .await
                .map(|d| AgentToHost::KeyDisposition {
                    consumed: d.is_consumed(),
                }),
            HostToAgent::Admin { event } => {
                let notice = self.admin.handle(event).await;
                Some(AgentToHost::Notice {
                    level: notice.level,
                    text: notice.text,
                })
            }
        }
    }

    async fn key_reply(&self, key: NavigationKey) -> AgentToHost {
        AgentToHost::KeyDisposition {
            consumed: self.lifecycle.on_key_down(key).await.is_consumed(),
        }
    }

    /// Resolves a method name and runs it.
    ///
    /// Unknown names produce [`CallOutcome::NotImplemented`], never `false`.
    pub async fn dispatch(&self, method: &str) -> CallOutcome {
        let Some(method) = Method::parse(method) else {
            debug!(method, "method not implemented");
            return CallOutcome::NotImplemented;
        };
        match method {
            Method::EnableKioskMode => CallOutcome::flag(self.enable_kiosk_mode().await),
            Method::DisableKioskMode => CallOutcome::flag(self.disable_kiosk_mode().await),
            Method::IsKioskModeEnabled => CallOutcome::flag(self.is_kiosk_mode_enabled().await),
            Method::IsDeviceOwner => CallOutcome::flag(self.is_device_owner().await),
            Method::EnableDeviceOwner => CallOutcome::flag(self.enable_device_owner().await),
            Method::CheckPermissions => CallOutcome::permissions(self.check_permissions().await),
        }
    }

    // ── Operations ────────────────────────────────────────────────────────────

    pub async fn enable_kiosk_mode(&self) -> bool {
        let result = self.controller.enable().await;
        self.collapse(Method::EnableKioskMode, result)
    }

    pub async fn disable_kiosk_mode(&self) -> bool {
        let result = self.controller.disable().await;
        self.collapse(Method::DisableKioskMode, result)
    }

    pub async fn is_kiosk_mode_enabled(&self) -> bool {
        self.controller.status().await
    }

    pub async fn is_device_owner(&self) -> bool {
        self.controller.oracle().is_privileged().await
    }

    pub async fn enable_device_owner(&self) -> bool {
        let result = self.controller.provisioner().grant_device_ownership().await;
        self.collapse(Method::EnableDeviceOwner, result)
    }

    pub async fn check_permissions(&self) -> PermissionSnapshot {
        self.controller.permission_snapshot().await
    }

    fn collapse<T>(&self, method: Method, result: Result<T, KioskError>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(method = method.as_str(), kind = e.kind(), "operation declined: {e}");
                self.notifier.notify(Notice::error(describe(method, &e)));
                false
            }
        }
    }
}

/// Operator-facing wording for a declined operation.
fn describe(method: Method, err: &KioskError) -> String {
    match err {
        KioskError::PrivilegeDenied => "The application is not the device owner".to_string(),
        KioskError::AuthorityUnreachable { reason } => {
            format!("Elevated shell unavailable: {reason}")
        }
        KioskError::PlatformCommandFailed { .. } => format!("{} failed: {err}", method.as_str()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Application layer use cases for the kiosk agent.
//!
//! Everything here depends only on the traits in [`ports`] and on
//! `kiosk-core` domain types.  No process is spawned and no socket is opened
//! in this layer, so every component can be driven by the simulated device in
//! tests.
//!
//! # Sub-modules
//!
//! - **`ports`** – Traits for the external collaborators: the device-policy
//!   authority, the lock-task platform, the elevated shell, and the
//!   notification sink.
//! - **`privilege_oracle`** / **`lock_monitor`** – The two leaf queries, with
//!   deliberately opposite failure policies.
//! - **`kiosk_controller`** – The intended-state flag and the enable /
//!   disable / reconcile state machine.
//! - **`escalation`** – Device-owner registration through the elevated shell.
//! - **`lifecycle`** – Host UI callbacks (key suppression, re-foregrounding).
//! - **`admin_receiver`** – Device-admin broadcast callbacks.
//! - **`control_surface`** – The request boundary that collapses every
//!   failure to a boolean.

use std::sync::Arc;

pub mod admin_receiver;
pub mod control_surface;
pub mod escalation;
pub mod kiosk_controller;
pub mod lifecycle;
pub mod lock_monitor;
pub mod ports;
pub mod privilege_oracle;

pub use control_surface::ControlSurface;
pub use kiosk_controller::{KioskController, Reconciliation};

/// The set of external collaborators the application layer is built from.
///
/// Built once by the infrastructure layer (or by a test) and consumed by
/// [`ControlSurface::assemble`].
#[derive(Clone)]
pub struct DevicePorts {
    pub policy: Arc<dyn ports::DevicePolicy>,
    pub lock_task: Arc<dyn ports::LockTaskPlatform>,
    pub shell: Arc<dyn ports::ElevatedShell>,
    pub notifier: Arc<dyn ports::NotificationSink>,
}

//! Domain entities for Kiosk Lock.
//!
//! This module contains pure business types with no infrastructure
//! dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! The innermost layer of the workspace.  Domain code:
//!
//! - Names the concepts the system is about: privilege, intended vs observed
//!   lock state, the permission snapshot handed back to callers.
//! - Has **no** imports from process, filesystem, or network libraries.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! The application layer (in `kiosk-agent`) combines these types into the
//! kiosk controller; the infrastructure layer talks to the real device.

pub mod admin;
pub mod error;
pub mod identity;
pub mod input;
pub mod notice;
pub mod state;

pub use admin::AdminEvent;
pub use error::{KioskError, Transition};
pub use identity::AppIdentity;
pub use input::{KeyDisposition, LifecycleEvent, NavigationKey};
pub use notice::{Notice, NoticeLevel};
pub use state::{
    IntendedLockState, LockTaskModeState, ObservedLockState, PermissionSnapshot, PrivilegeState,
};

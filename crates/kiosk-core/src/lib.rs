//! # kiosk-core
//!
//! Shared library for Kiosk Lock containing the domain vocabulary of the
//! kiosk-mode state machine and the JSON wire protocol spoken on the control
//! channel.
//!
//! This crate has zero dependencies on OS APIs, process spawning, or network
//! sockets.  Everything in it can be unit-tested on any machine.
//!
//! # Architecture overview (for beginners)
//!
//! Kiosk Lock pins a single application to the foreground of a managed
//! device ("lock task" or "kiosk" mode).  Only an application that holds the
//! *device-owner* privilege may do this, and the platform itself is the
//! authority on whether the device is currently locked.
//!
//! This crate (`kiosk-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Privilege and lock states, the permission snapshot, the
//!   application identity, navigation keys, device-admin events, and the error
//!   taxonomy used by the controller.
//!
//! - **`protocol`** – How requests and replies travel between a host process
//!   and the kiosk agent.  Frames are `type`-tagged JSON objects.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `kiosk_core::KioskError` instead of `kiosk_core::domain::error::KioskError`.
pub use domain::error::{KioskError, Transition};
pub use domain::identity::AppIdentity;
pub use domain::state::{
    IntendedLockState, LockTaskModeState, ObservedLockState, PermissionSnapshot, PrivilegeState,
};
pub use protocol::codec::{decode_agent_frame, decode_host_frame, encode_frame, CodecError};
pub use protocol::messages::{AgentToHost, CallOutcome, HostToAgent, Method};

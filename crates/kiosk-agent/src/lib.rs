//! kiosk-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and the
//! binary entry point in `main.rs` share the same module tree.
//!
//! # What does kiosk-agent do? (for beginners)
//!
//! The agent runs next to the application that should be pinned to the
//! foreground.  A host process (the app's UI runtime) connects to it over a
//! local WebSocket and asks it to:
//!
//! 1. Enable or disable kiosk mode (lock task) for the app's package.
//! 2. Report whether the device is currently locked and whether the app holds
//!    the device-owner privilege.
//! 3. Register the app as device owner through an elevated shell (`su`).
//! 4. Decide whether navigation keys should be swallowed and whether the app
//!    must be re-launched after it was stopped while locked.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host (JSON over WebSocket)
//!         ↕
//! [kiosk-agent]
//!   ├── application/      ControlSurface → KioskController → PrivilegeOracle,
//!   │                     LockStateMonitor; DeviceOwnerProvisioner; lifecycle
//!   └── infrastructure/
//!         ├── platform/   Simulated and command-driven device backends
//!         ├── shell/      `su` / `sh` process runner with a bounded wait
//!         ├── control_server  WebSocket accept loop
//!         └── storage/    TOML configuration
//! ```

/// Application layer: the kiosk state machine and its request boundary.
pub mod application;

/// Infrastructure layer: device backends, process runner, server, config.
pub mod infrastructure;

//! Infrastructure layer for the kiosk agent.
//!
//! # Sub-modules
//!
//! - **`platform`** – Device backends implementing the `DevicePolicy` and
//!   `LockTaskPlatform` ports: an in-process simulation and a backend that
//!   runs configurable shell commands.
//! - **`shell`** – The `su` / `sh` process runner with a bounded wait.
//! - **`notify`** – Notification sinks (tracing, in-memory).
//! - **`control_server`** – WebSocket accept loop speaking the JSON frame
//!   protocol from `kiosk_core::protocol`.
//! - **`storage`** – TOML configuration.
//! - **`bootstrap`** – Turns configuration into a set of ports.

pub mod bootstrap;
pub mod control_server;
pub mod notify;
pub mod platform;
pub mod shell;
pub mod storage;

pub use bootstrap::{build_ports, identity_from};
pub use control_server::{run_server, serve};

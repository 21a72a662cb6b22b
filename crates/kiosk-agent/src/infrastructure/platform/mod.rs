//! Device backends implementing the platform ports.
//!
//! - **`simulated`** – An in-process model of the device-policy authority and
//!   the lock-task platform.  Used by tests and by the agent's `simulated`
//!   backend for development without a device.
//! - **`command`** – Talks to a real device by running configurable shell
//!   command templates and parsing their output.

pub mod command;
pub mod simulated;

pub use command::CommandDevice;
pub use simulated::{DeviceCommand, SimulatedDevice, SimulatedShell};

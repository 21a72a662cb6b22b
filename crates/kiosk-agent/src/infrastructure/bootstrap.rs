//! Wires configuration into concrete ports.

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::AppIdentity;
use tracing::info;

use crate::application::ports::ElevatedShell;
use crate::application::DevicePorts;
use crate::infrastructure::notify::TracingNotifier;
use crate::infrastructure::platform::{CommandDevice, SimulatedDevice, SimulatedShell};
use crate::infrastructure::shell::ProcessShell;
use crate::infrastructure::storage::{AgentConfig, DeviceBackend};

/// The application identity described by the `[identity]` section.
pub fn identity_from(config: &AgentConfig) -> AppIdentity {
    AppIdentity::new(config.identity.package.clone())
        .with_admin_receiver(config.identity.admin_receiver.clone())
}

/// Builds the device ports for the configured backend.
///
/// - `simulated` – one [`SimulatedDevice`] behind both platform ports and a
///   [`SimulatedShell`] linked to it.  Nothing on the host is touched.
/// - `command` – a [`CommandDevice`] whose templates run through `su` (or
///   `sh` when `elevated = false`), plus the real `su` binary as the elevated
///   context for device-owner registration.
pub fn build_ports(config: &AgentConfig) -> DevicePorts {
    let notifier = Arc::new(TracingNotifier);
    let timeout = Duration::from_secs(config.shell.timeout_secs);

    match config.device.backend {
        DeviceBackend::Simulated => {
            info!(package = %config.identity.package, "using simulated device backend");
            let device = Arc::new(SimulatedDevice::new(config.identity.package.clone()));
            DevicePorts {
                policy: device.clone(),
                lock_task: device.clone(),
                shell: Arc::new(SimulatedShell::new(device)),
                notifier,
            }
        }
        DeviceBackend::Command => {
            let su: Arc<dyn ElevatedShell> =
                Arc::new(ProcessShell::su(config.shell.su_binary.clone(), timeout));
            let runner: Arc<dyn ElevatedShell> = if config.device.elevated {
                Arc::clone(&su)
            } else {
                Arc::new(ProcessShell::sh(timeout))
            };
            info!(
                su = %config.shell.su_binary,
                elevated = config.device.elevated,
                "using command device backend"
            );
            let device = Arc::new(CommandDevice::new(
                runner,
                config.device.clone(),
                identity_from(config),
                config.identity.launch_activity.clone(),
            ));
            DevicePorts {
                policy: device.clone(),
                lock_task: device,
                shell: su,
                notifier,
            }
        }
    }
}

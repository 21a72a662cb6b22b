//! Kiosk Lock agent: entry point.
//!
//! Loads the TOML configuration, applies command-line overrides, builds the
//! device ports for the configured backend, reconciles the kiosk state with
//! the platform, and serves the WebSocket control channel until Ctrl+C.
//!
//! # Usage
//!
//! ```text
//! kiosk-agent [OPTIONS]
//!
//! Options:
//!   --config <PATH>          Config file [default: platform config dir]
//!   --bind <IP>              Control listener address [default: 127.0.0.1]
//!   --port <PORT>            Control listener port [default: 47800]
//!   --backend <BACKEND>      simulated | command
//!   --package <NAME>         Application package to lock
//!   --su <PATH>              Elevated shell binary
//!   --shell-timeout <SECS>   Bounded wait for shell commands
//!   --write-config           Save the merged config and exit
//! ```
//!
//! Every option can also come from a `KIOSK_*` environment variable.  The
//! precedence is: CLI flag, then environment variable, then config file, then
//! built-in default.
//!
//! `--write-config` saves the merged result to the `--config` path (or the
//! default location) and exits without serving, which is the quickest way
//! to produce a complete, editable config file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kiosk_agent::application::{ControlSurface, Reconciliation};
use kiosk_agent::infrastructure::storage::{
    config_file_path, load_config, load_config_from, save_config_to, AgentConfig, DeviceBackend,
};
use kiosk_agent::infrastructure::{build_ports, identity_from, run_server};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Kiosk Lock agent.
///
/// Pins one application to the foreground when it holds the device-owner
/// privilege, and answers control requests over a local WebSocket.
#[derive(Debug, Parser)]
#[command(
    name = "kiosk-agent",
    about = "Privilege-gated kiosk-mode controller with a WebSocket control channel",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Must exist when given.
    #[arg(long, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    /// IP address for the control listener.
    #[arg(long, env = "KIOSK_BIND")]
    bind: Option<String>,

    /// TCP port for the control listener.
    #[arg(long, env = "KIOSK_PORT")]
    port: Option<u16>,

    /// Device backend.
    #[arg(long, value_enum, env = "KIOSK_BACKEND")]
    backend: Option<DeviceBackend>,

    /// Package name of the application to lock.
    #[arg(long, env = "KIOSK_PACKAGE")]
    package: Option<String>,

    /// Elevated shell binary.
    #[arg(long, env = "KIOSK_SU")]
    su: Option<String>,

    /// Bounded wait for one shell command, in seconds.
    #[arg(long, env = "KIOSK_SHELL_TIMEOUT")]
    shell_timeout: Option<u64>,

    /// Save the merged configuration to the config file and exit.
    #[arg(long, env = "KIOSK_WRITE_CONFIG")]
    write_config: bool,
}

impl Cli {
    /// Reads the config file named by `--config`, or the default one.
    ///
    /// With `--write-config` a missing explicit file starts from defaults,
    /// since it is about to be created.
    fn load(&self) -> anyhow::Result<AgentConfig> {
        match &self.config {
            Some(path) if self.write_config && !path.exists() => Ok(AgentConfig::default()),
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => load_config().context("failed to load config"),
        }
    }

    /// Applies the command-line overrides on top of `config`.
    fn apply(self, mut config: AgentConfig) -> AgentConfig {
        if let Some(bind) = self.bind {
            config.control.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.control.port = port;
        }
        if let Some(backend) = self.backend {
            config.device.backend = backend;
        }
        if let Some(package) = self.package {
            config.identity.package = package;
        }
        if let Some(su) = self.su {
            config.shell.su_binary = su;
        }
        if let Some(secs) = self.shell_timeout {
            config.shell.timeout_secs = secs;
        }
        config
    }
}

/// Where `--write-config` saves to.
fn config_target(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => config_file_path().context("failed to resolve the default config path"),
    }
}

fn write_config(config: &AgentConfig, path: &Path) -> anyhow::Result<()> {
    save_config_to(config, path)
        .with_context(|| format!("failed to write config to {}", path.display()))
}

/// The control listener address from the `[control]` section.
fn bind_addr(config: &AgentConfig) -> anyhow::Result<SocketAddr> {
    let text = format!("{}:{}", config.control.bind_address, config.control.port);
    text.parse()
        .with_context(|| format!("invalid control bind address: '{text}'"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load()?;
    let write_target = cli.write_config.then(|| cli.config.clone());
    let config = cli.apply(config);

    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.agent.log_level)),
        )
        .init();

    if let Some(explicit) = write_target {
        let path = config_target(explicit)?;
        write_config(&config, &path)?;
        info!("wrote config to {}", path.display());
        return Ok(());
    }

    let addr = bind_addr(&config)?;
    info!(
        "Kiosk Lock agent starting: package={}, backend={:?}, control={addr}",
        config.identity.package, config.device.backend
    );

    let surface = Arc::new(ControlSurface::assemble(
        identity_from(&config),
        build_ports(&config),
        config.agent.secure_window,
    ));

    match surface.controller().reconcile().await {
        Reconciliation::ForcedUnlockFailed(e) => {
            warn!("start-up reconciliation could not release the lock: {e}")
        }
        outcome => info!(?outcome, "start-up reconciliation"),
    }

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(addr, surface, running).await?;

    info!("Kiosk Lock agent stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("kiosk-agent").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_flags_keep_config_values() {
        // Arrange
        let mut config = AgentConfig::default();
        config.control.port = 9001;

        // Act
        let merged = Cli {
            config: None,
            bind: None,
            port: None,
            backend: None,
            package: None,
            su: None,
            shell_timeout: None,
            write_config: false,
        }
        .apply(config);

        // Assert
        assert_eq!(merged.control.port, 9001);
        assert_eq!(merged.device.backend, DeviceBackend::Simulated);
    }

    #[test]
    fn test_flags_override_config() {
        let merged = cli(&[
            "--bind",
            "0.0.0.0",
            "--port",
            "48000",
            "--backend",
            "command",
            "--package",
            "org.museum.guide",
            "--su",
            "/system/xbin/su",
            "--shell-timeout",
            "5",
        ])
        .apply(AgentConfig::default());

        assert_eq!(merged.control.bind_address, "0.0.0.0");
        assert_eq!(merged.control.port, 48000);
        assert_eq!(merged.device.backend, DeviceBackend::Command);
        assert_eq!(merged.identity.package, "org.museum.guide");
        assert_eq!(merged.shell.su_binary, "/system/xbin/su");
        assert_eq!(merged.shell.timeout_secs, 5);
    }

    #[test]
    fn test_write_config_saves_merged_values() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("kiosk-agent-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let args = cli(&[
            "--config",
            path.to_str().unwrap(),
            "--port",
            "48100",
            "--write-config",
        ]);
        assert!(args.write_config);

        // Act
        let loaded = args.load().expect("missing file starts from defaults");
        let target = config_target(args.config.clone()).unwrap();
        let merged = args.apply(loaded);
        write_config(&merged, &target).unwrap();

        // Assert
        let restored = load_config_from(&path).unwrap();
        assert_eq!(restored.control.port, 48100);
        assert_eq!(restored, merged);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_explicit_config_is_error_without_write_flag() {
        let path = std::env::temp_dir().join("kiosk-agent-definitely-missing.toml");
        let args = cli(&["--config", path.to_str().unwrap()]);
        assert!(args.load().is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Cli::try_parse_from(["kiosk-agent", "--backend", "usb"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_bind_addr_is_loopback() {
        let addr = bind_addr(&AgentConfig::default()).unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:47800");
    }

    #[test]
    fn test_invalid_bind_address_returns_error() {
        let mut config = AgentConfig::default();
        config.control.bind_address = "not.an.ip".into();
        assert!(bind_addr(&config).is_err());
    }
}

//! TOML-based configuration for the kiosk agent.
//!
//! Reads `AgentConfig` from the platform-appropriate config file:
//! - Linux:    `~/.config/kiosklock/config.toml` (or `$XDG_CONFIG_HOME`)
//! - macOS:    `~/Library/Application Support/KioskLock/config.toml`
//! - Windows:  `%APPDATA%\KioskLock\config.toml`
//!
//! A missing file is not an error: the agent starts with defaults, which use
//! the simulated device backend and listen on `127.0.0.1:47800`.
//!
//! ```toml
//! [agent]
//! log_level = "info"
//! secure_window = true
//!
//! [identity]
//! package = "com.example.showcase"
//! admin_receiver = ".DeviceAdminReceiver"
//!
//! [control]
//! bind_address = "127.0.0.1"
//! port = 47800
//!
//! [shell]
//! su_binary = "su"
//! timeout_secs = 30
//!
//! [device]
//! backend = "command"
//! elevated = true
//! start_lock_task = "am task lock {package}"
//! ```
//!
//! # Command templates (for beginners)
//!
//! The `command` backend has no API bindings to the device.  Instead each
//! platform operation is a shell command line with placeholders that are
//! filled in before the command runs:
//!
//! | Placeholder  | Replaced with                                   |
//! |--------------|-------------------------------------------------|
//! | `{package}`  | the application package                         |
//! | `{admin}`    | the admin component, `package/receiver`         |
//! | `{packages}` | the lock-task allowlist, space separated        |
//! | `{activity}` | the activity launched by "bring to front"       |
//! | `{secure}`   | `true` or `false`                               |
//!
//! Commands that change device state have no default; leaving one unset makes
//! that operation fail with "not supported" instead of guessing.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kiosk_core::domain::identity::DEFAULT_ADMIN_RECEIVER;

use crate::infrastructure::shell::DEFAULT_SHELL_TIMEOUT;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level agent configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub control: ControlSection,
    #[serde(default)]
    pub shell: ShellSection,
    #[serde(default)]
    pub device: DeviceSection,
}

/// General agent behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSection {
    /// `tracing` log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Whether `create` sets the secure-window flag.
    #[serde(default = "default_true")]
    pub secure_window: bool,
}

/// Which application the agent locks the device to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentitySection {
    #[serde(default = "default_package")]
    pub package: String,
    /// Admin receiver class; a leading `.` is relative to `package`.
    #[serde(default = "default_admin_receiver")]
    pub admin_receiver: String,
    /// Activity launched when the app must be brought back to the front.
    #[serde(default = "default_launch_activity")]
    pub launch_activity: String,
}

/// Control-surface listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlSection {
    /// IP address to bind to.  Keep this on loopback unless the host runs
    /// elsewhere: the control surface has no authentication.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_control_port")]
    pub port: u16,
}

/// Elevated shell settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellSection {
    #[serde(default = "default_su_binary")]
    pub su_binary: String,
    /// Bounded wait for one shell invocation, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Which device implementation backs the platform ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceBackend {
    /// In-process model of the device; nothing on the host is changed.
    #[default]
    Simulated,
    /// Shell command templates run against the real device.
    Command,
}

/// Device backend selection and command templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSection {
    #[serde(default)]
    pub backend: DeviceBackend,
    /// Run the templates through the `su` binary rather than `sh`.
    #[serde(default = "default_true")]
    pub elevated: bool,
    #[serde(default = "default_device_owner_query")]
    pub device_owner_query: Option<String>,
    #[serde(default = "default_lock_state_query")]
    pub lock_state_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_lock_task_packages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_lock_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_lock_task: Option<String>,
    #[serde(default = "default_bring_to_front")]
    pub bring_to_front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_secure_window: Option<String>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_package() -> String {
    "com.example.showcase".to_string()
}
fn default_admin_receiver() -> String {
    DEFAULT_ADMIN_RECEIVER.to_string()
}
fn default_launch_activity() -> String {
    ".MainActivity".to_string()
}
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}
fn default_control_port() -> u16 {
    47800
}
fn default_su_binary() -> String {
    "su".to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_SHELL_TIMEOUT.as_secs()
}
fn default_device_owner_query() -> Option<String> {
    Some("dpm list-owners".to_string())
}
fn default_lock_state_query() -> Option<String> {
    Some("dumpsys activity activities".to_string())
}
fn default_bring_to_front() -> Option<String> {
    Some("am start -f 0x14000000 -n {package}/{activity}".to_string())
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            secure_window: default_true(),
        }
    }
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            package: default_package(),
            admin_receiver: default_admin_receiver(),
            launch_activity: default_launch_activity(),
        }
    }
}

impl Default for ControlSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_control_port(),
        }
    }
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            su_binary: default_su_binary(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            backend: DeviceBackend::default(),
            elevated: default_true(),
            device_owner_query: default_device_owner_query(),
            lock_state_query: default_lock_state_query(),
            set_lock_task_packages: None,
            start_lock_task: None,
            stop_lock_task: None,
            bring_to_front: default_bring_to_front(),
            set_secure_window: None,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AgentConfig` from the default location, returning
/// `AgentConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AgentConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AgentConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Loads `AgentConfig` from an explicit path.  Unlike [`load_config`], a
/// missing file is an error: the operator asked for this file.
pub fn load_config_from(path: &Path) -> Result<AgentConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AgentConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `kiosklock`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("KioskLock"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KioskLock")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // XDG_CONFIG_HOME or ~/.config (Linux, Android, the BSDs)
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("kiosklock"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Device backend driven by shell command templates.
//!
//! [`CommandDevice`] implements [`DevicePolicy`] and [`LockTaskPlatform`] by
//! rendering the templates from the `[device]` config section and running
//! them through an [`ElevatedShell`] (either `su` or plain `sh`).
//!
//! # Reading answers back (for beginners)
//!
//! Queries are answered by parsing what the tools print:
//!
//! - **Device owner** – `dpm list-owners` prints one line per owner, e.g.
//!   `User 0: admin=com.example.showcase/.DeviceAdminReceiver,DeviceOwner`.
//!   The package is the owner when such a line names it with `DeviceOwner`.
//! - **Lock-task mode** – `dumpsys activity activities` contains a line
//!   `mLockTaskModeState=LOCKED`.  A custom query may instead print the bare
//!   token (`NONE`, `LOCKED`, `PINNED`).
//!
//! Output that matches neither shape is a [`PlatformError::UnexpectedOutput`],
//! which the monitor and oracle turn into their fail-open / fail-closed
//! answers.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_core::{AppIdentity, LockTaskModeState};
use tracing::debug;

use crate::application::ports::{
    DevicePolicy, ElevatedShell, LockTaskPlatform, PlatformError, ShellOutput,
};
use crate::infrastructure::storage::config::DeviceSection;

const LOCK_TASK_MODE_KEY: &str = "mLockTaskModeState=";
const ADMIN_KEY: &str = "admin=";

/// Per-call placeholder values.  Unset fields fall back to the identity.
#[derive(Debug, Default, Clone, Copy)]
struct TemplateArgs<'a> {
    admin: Option<&'a str>,
    packages: &'a [String],
    secure: Option<bool>,
}

pub struct CommandDevice {
    runner: Arc<dyn ElevatedShell>,
    templates: DeviceSection,
    identity: AppIdentity,
    launch_activity: String,
}

impl CommandDevice {
    pub fn new(
        runner: Arc<dyn ElevatedShell>,
        templates: DeviceSection,
        identity: AppIdentity,
        launch_activity: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            templates,
            identity,
            launch_activity: launch_activity.into(),
        }
    }

    /// Fills the placeholders of `template`.
    fn render(&self, template: &str, args: TemplateArgs<'_>) -> String {
        let admin = match args.admin {
            Some(admin) => admin.to_string(),
            None => self.identity.admin_component(),
        };
        let mut line = template
            .replace("{package}", &self.identity.package)
            .replace("{admin}", &admin)
            .replace("{packages}", &args.packages.join(" "))
            .replace("{activity}", &self.launch_activity);
        if let Some(secure) = args.secure {
            line = line.replace("{secure}", if secure { "true" } else { "false" });
        }
        line
    }

    /// Runs a rendered command and insists on a zero exit status.
    async fn execute(&self, operation: &'static str, line: String) -> Result<ShellOutput, PlatformError> {
        debug!(operation, command = %line, "running device command");
        let output = self
            .runner
            .run(&line)
            .await
            .map_err(|e| PlatformError::Unavailable(e.to_string()))?;
        if output.success() {
            Ok(output)
        } else {
            let detail = output.stderr.trim();
            Err(PlatformError::Rejected(match output.status {
                Some(code) => format!("{operation} exited with {code}: {detail}"),
                None => format!("{operation} terminated by signal: {detail}"),
            }))
        }
    }

    async fn run_template(
        &self,
        operation: &'static str,
        template: &Option<String>,
        args: TemplateArgs<'_>,
    ) -> Result<ShellOutput, PlatformError> {
        let Some(template) = template else {
            return Err(PlatformError::Unsupported(operation));
        };
        let line = self.render(template, args);
        self.execute(operation, line).await
    }
}

#[async_trait]
impl DevicePolicy for CommandDevice {
    async fn is_device_owner(&self, package: &str) -> Result<bool, PlatformError> {
        let output = self
            .run_template("device_owner_query", &self.templates.device_owner_query, TemplateArgs::default())
            .await?;
        Ok(parse_device_owner(&output.stdout, package))
    }

    async fn set_lock_task_packages(
        &self,
        admin_component: &str,
        packages: &[String],
    ) -> Result<(), PlatformError> {
        let args = TemplateArgs {
            admin: Some(admin_component),
            packages,
            ..TemplateArgs::default()
        };
        self.run_template(
            "set_lock_task_packages",
            &self.templates.set_lock_task_packages,
            args,
        )
        .await
        .map(drop)
    }
}

#[async_trait]
impl LockTaskPlatform for CommandDevice {
    async fn lock_task_mode_state(&self) -> Result<LockTaskModeState, PlatformError> {
        let output = self
            .run_template("lock_state_query", &self.templates.lock_state_query, TemplateArgs::default())
            .await?;
        parse_lock_task_mode(&output.stdout).ok_or_else(|| {
            PlatformError::UnexpectedOutput(format!(
                "no lock task mode in {} bytes of query output",
                output.stdout.len()
            ))
        })
    }

    async fn start_lock_task(&self) -> Result<(), PlatformError> {
        self.run_template("start_lock_task", &self.templates.start_lock_task, TemplateArgs::default())
            .await
            .map(drop)
    }

    async fn stop_lock_task(&self) -> Result<(), PlatformError> {
        self.run_template("stop_lock_task", &self.templates.stop_lock_task, TemplateArgs::default())
            .await
            .map(drop)
    }

    async fn bring_to_front(&self) -> Result<(), PlatformError> {
        self.run_template("bring_to_front", &self.templates.bring_to_front, TemplateArgs::default())
            .await
            .map(drop)
    }

    async fn set_secure_window(&self, secure: bool) -> Result<(), PlatformError> {
        self.run_template(
            "set_secure_window",
            &self.templates.set_secure_window,
            TemplateArgs {
                secure: Some(secure),
                ..TemplateArgs::default()
            },
        )
        .await
        .map(drop)
    }
}

// ── Output parsing ────────────────────────────────────────────────────────────

/// `true` when a line of `dpm list-owners`-style output names `package` as
/// the device owner.
///
/// The token after `admin=` is `<package>/<class>,<flag>,...`; the package
/// must match exactly and one of the flags must be `DeviceOwner`.
pub fn parse_device_owner(stdout: &str, package: &str) -> bool {
    stdout.lines().any(|line| {
        let Some(start) = line.find(ADMIN_KEY) else {
            return false;
        };
        let token = line[start + ADMIN_KEY.len()..]
            .split_whitespace()
            .next()
            .unwrap_or_default();
        let mut fields = token.split(',');
        let owner = fields
            .next()
            .and_then(|component| component.split_once('/'))
            .map(|(pkg, _)| pkg);
        owner == Some(package) && fields.any(|flag| flag == "DeviceOwner")
    })
}

/// Extracts the lock-task mode from `dumpsys` output or a bare token.
pub fn parse_lock_task_mode(stdout: &str) -> Option<LockTaskModeState> {
    if let Some(start) = stdout.find(LOCK_TASK_MODE_KEY) {
        let rest = &stdout[start + LOCK_TASK_MODE_KEY.len()..];
        let token: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        return LockTaskModeState::parse_token(&token);
    }
    LockTaskModeState::parse_token(stdout)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

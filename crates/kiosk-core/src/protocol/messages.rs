//! JSON frame types for the control channel.
//!
//! # Message flow
//!
//! ```text
//! Host  → Agent:  JSON text frame  →  HostToAgent
//! Agent → Host:   AgentToHost      →  JSON text frame
//! ```
//!
//! # JSON discriminant
//!
//! Every frame is a JSON object with a `"type"` field that identifies the
//! variant.  All other fields live in the same object:
//!
//! ```json
//! {"type":"Call","id":7,"method":"enableKioskMode"}
//! {"type":"Reply","id":7,"outcome":{"status":"success","value":true}}
//! ```
//!
//! # Why is `method` a `String` and not a [`Method`]?
//!
//! An unrecognized method name is a *valid* request that must be answered
//! with an explicit `notImplemented` reply.  If the frame used the [`Method`]
//! enum directly, such a request would fail to decode and the host would get
//! a protocol error instead.  The control surface resolves the name with
//! [`Method::parse`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{AdminEvent, LifecycleEvent, NavigationKey, NoticeLevel, PermissionSnapshot};

// ── Method names ──────────────────────────────────────────────────────────────

/// The operations a host may invoke through a `Call` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    EnableKioskMode,
    DisableKioskMode,
    IsKioskModeEnabled,
    IsDeviceOwner,
    EnableDeviceOwner,
    CheckPermissions,
}

impl Method {
    /// Every recognized method, in the order they are documented.
    pub const ALL: [Method; 6] = [
        Method::EnableKioskMode,
        Method::DisableKioskMode,
        Method::IsKioskModeEnabled,
        Method::IsDeviceOwner,
        Method::EnableDeviceOwner,
        Method::CheckPermissions,
    ];

    /// Resolves a wire method name.  Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// The wire name of this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::EnableKioskMode => "enableKioskMode",
            Method::DisableKioskMode => "disableKioskMode",
            Method::IsKioskModeEnabled => "isKioskModeEnabled",
            Method::IsDeviceOwner => "isDeviceOwner",
            Method::EnableDeviceOwner => "enableDeviceOwner",
            Method::CheckPermissions => "checkPermissions",
        }
    }
}

// ── Host → Agent ──────────────────────────────────────────────────────────────

/// All frames a host may send to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostToAgent {
    /// Invoke one control-surface method.  `id` is echoed in the reply.
    Call { id: u64, method: String },

    /// A host activity lifecycle callback.
    Lifecycle { event: LifecycleEvent },

    /// A key-down event; the agent answers whether to consume it.
    KeyDown { key: NavigationKey },

    /// A device-admin receiver callback.
    Admin { event: AdminEvent },
}

// ── Agent → Host ──────────────────────────────────────────────────────────────

/// Result of a `Call`.
///
/// `NotImplemented` is distinct from a `false` success value: the host must
/// be able to tell "declined" from "no such operation".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CallOutcome {
    Success { value: Value },
    NotImplemented,
}

impl CallOutcome {
    /// A boolean success reply.
    pub fn flag(value: bool) -> Self {
        Self::Success {
            value: Value::Bool(value),
        }
    }

    /// A permission-snapshot reply.
    pub fn permissions(snapshot: PermissionSnapshot) -> Self {
        // Serializing a struct of three bools cannot fail.
        let value = serde_json::to_value(snapshot).unwrap_or(Value::Null);
        Self::Success { value }
    }

    /// Returns the boolean value of a success reply, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Success { value } => value.as_bool(),
            Self::NotImplemented => None,
        }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

/// All frames the agent sends back to a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentToHost {
    /// Answer to a `Call` with the same `id`.
    Reply { id: u64, outcome: CallOutcome },

    /// Answer to a `KeyDown` or a back-press lifecycle event.
    KeyDisposition { consumed: bool },

    /// Operator-visible diagnostics, e.g. the warning returned for
    /// `disableRequested`.
    Notice { level: NoticeLevel, text: String },

    /// The previous frame could not be decoded.  The session stays open.
    ProtocolError { message: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────

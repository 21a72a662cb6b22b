//! Host UI lifecycle events and navigation keys.
//!
//! The host process forwards these so the agent can decide whether a
//! navigation key should be swallowed and whether the app must be brought
//! back to the foreground.

use serde::{Deserialize, Serialize};

/// Lifecycle callbacks of the host activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LifecycleEvent {
    Create,
    Resume,
    Pause,
    Stop,
    BackPressed,
}

/// Keys the host reports through `KeyDown`.
///
/// Only the three system navigation keys matter to kiosk mode; everything
/// else is reported as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationKey {
    Back,
    Home,
    AppSwitch,
    Other,
}

impl NavigationKey {
    /// Keys that would take the user out of the pinned application.
    pub fn is_system_navigation(self) -> bool {
        matches!(self, Self::Back | Self::Home | Self::AppSwitch)
    }
}

/// What the host should do with a key or back-press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Swallow the event.
    Consumed,
    /// Let the host's default handling run.
    PassThrough,
}

impl KeyDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_navigation_keys_are_system_navigation() {
        assert!(NavigationKey::Back.is_system_navigation());
        assert!(NavigationKey::Home.is_system_navigation());
        assert!(NavigationKey::AppSwitch.is_system_navigation());
        assert!(!NavigationKey::Other.is_system_navigation());
    }

    #[test]
    fn test_key_names_are_camel_case_on_the_wire() {
        let json = serde_json::to_string(&NavigationKey::AppSwitch).unwrap();
        assert_eq!(json, "\"appSwitch\"");
        let event: LifecycleEvent = serde_json::from_str("\"backPressed\"").unwrap();
        assert_eq!(event, LifecycleEvent::BackPressed);
    }
}

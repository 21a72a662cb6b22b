//! Text codec for control-channel frames.
//!
//! Wire format: one JSON object per WebSocket text frame, at most
//! [`MAX_FRAME_LEN`] bytes.  The codec is a thin, size-checked wrapper around
//! `serde_json` so that every caller rejects oversized or empty frames the
//! same way.

use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use crate::protocol::messages::{AgentToHost, HostToAgent};

/// Largest frame the codec accepts, in bytes.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    /// The frame contained only whitespace.
    #[error("empty frame")]
    Empty,

    /// The frame exceeds [`MAX_FRAME_LEN`].
    #[error("frame too large: {len} bytes (max {max})")]
    TooLarge { len: usize, max: usize },

    /// The frame is not valid JSON or does not match any frame variant.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes any frame into its JSON text form.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails, or
/// [`CodecError::TooLarge`] if the result would exceed [`MAX_FRAME_LEN`].
///
/// # Examples
///
/// ```rust
/// use kiosk_core::protocol::codec::{decode_host_frame, encode_frame};
/// use kiosk_core::protocol::messages::HostToAgent;
///
/// let call = HostToAgent::Call { id: 1, method: "isKioskModeEnabled".into() };
/// let text = encode_frame(&call).unwrap();
/// assert_eq!(decode_host_frame(&text).unwrap(), call);
/// ```
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<String, CodecError> {
    let text = serde_json::to_string(frame).map_err(|e| CodecError::Malformed(e.to_string()))?;
    check_len(text.len())?;
    Ok(text)
}

/// Decodes a frame sent by a host.
///
/// # Errors
///
/// Returns [`CodecError`] for empty, oversized, or malformed input.
pub fn decode_host_frame(text: &str) -> Result<HostToAgent, CodecError> {
    let text = precheck(text)?;
    serde_json::from_str(text).map_err(|e| {
        trace!("rejecting host frame: {e}");
        CodecError::Malformed(e.to_string())
    })
}

/// Decodes a frame sent by the agent.
///
/// # Errors
///
/// Returns [`CodecError`] for empty, oversized, or malformed input.
pub fn decode_agent_frame(text: &str) -> Result<AgentToHost, CodecError> {
    let text = precheck(text)?;
    serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn precheck(text: &str) -> Result<&str, CodecError> {
    check_len(text.len())?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(trimmed)
}

fn check_len(len: usize) -> Result<(), CodecError> {
    if len > MAX_FRAME_LEN {
        return Err(CodecError::TooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LifecycleEvent, NavigationKey};

    #[test]
    fn test_decode_rejects_empty_frame() {
        assert_eq!(decode_host_frame("   \n"), Err(CodecError::Empty));
    }

    #[test]
    fn test_decode_rejects_oversized_frame() {
        // Arrange
        let huge = " ".repeat(MAX_FRAME_LEN + 1);

        // Act
        let result = decode_host_frame(&huge);

        // Assert
        assert!(matches!(result, Err(CodecError::TooLarge { .. })));
    }

    #[test]
    fn test_decode_rejects_unknown_frame_type() {
        let result = decode_host_frame(r#"{"type":"Reboot"}"#);
        assert!(matches!(result, Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_decode_call_with_unknown_method_still_succeeds() {
        // Unknown method names must reach the control surface so it can
        // answer notImplemented.
        let frame = decode_host_frame(r#"{"type":"Call","id":1,"method":"factoryReset"}"#).unwrap();
        assert_eq!(
            frame,
            HostToAgent::Call {
                id: 1,
                method: "factoryReset".into()
            }
        );
    }

    #[test]
    fn test_decode_lifecycle_and_key_frames() {
        assert_eq!(
            decode_host_frame(r#"{"type":"Lifecycle","event":"stop"}"#).unwrap(),
            HostToAgent::Lifecycle {
                event: LifecycleEvent::Stop
            }
        );
        assert_eq!(
            decode_host_frame(r#"{"type":"KeyDown","key":"home"}"#).unwrap(),
            HostToAgent::KeyDown {
                key: NavigationKey::Home
            }
        );
    }
}

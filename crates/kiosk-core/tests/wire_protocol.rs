//! Integration tests for the kiosk-core control-channel protocol.
//!
//! These tests drive the public API the way a host SDK would: build a frame,
//! put it on the wire, and read the agent's answer back.

use kiosk_core::{
    decode_agent_frame, decode_host_frame,
    domain::{AdminEvent, NoticeLevel},
    encode_frame,
    protocol::MAX_FRAME_LEN,
    AgentToHost, CallOutcome, CodecError, HostToAgent, Method, PermissionSnapshot,
};

#[test]
fn test_host_sdk_call_frame_is_understood_by_agent() {
    let text = r#"{"type":"Call","id":42,"method":"checkPermissions"}"#;

    let frame = decode_host_frame(text).expect("valid call frame must decode");

    let HostToAgent::Call { id, method } = frame else {
        panic!("expected a Call frame");
    };
    assert_eq!(id, 42);
    assert_eq!(Method::parse(&method), Some(Method::CheckPermissions));
}

#[test]
fn test_permission_reply_reaches_host_with_expected_keys() {
    // Arrange
    let reply = AgentToHost::Reply {
        id: 42,
        outcome: CallOutcome::permissions(PermissionSnapshot {
            is_privileged: true,
            is_locked: true,
            has_elevated_shell_access: false,
        }),
    };

    // Act
    let text = encode_frame(&reply).expect("encode must succeed");
    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();

    // Assert
    assert_eq!(raw["type"], "Reply");
    assert_eq!(raw["outcome"]["status"], "success");
    assert_eq!(raw["outcome"]["value"]["isDeviceOwner"], true);
    assert_eq!(raw["outcome"]["value"]["isInLockTaskMode"], true);
    assert_eq!(raw["outcome"]["value"]["hasRootAccess"], false);
    assert_eq!(decode_agent_frame(&text).unwrap(), reply);
}

#[test]
fn test_admin_frame_nests_event_kind() {
    let text = r#"{"type":"Admin","event":{"kind":"disableRequested"}}"#;
    assert_eq!(
        decode_host_frame(text).unwrap(),
        HostToAgent::Admin {
            event: AdminEvent::DisableRequested
        }
    );
}

#[test]
fn test_notice_frame_decodes_on_host_side() {
    let text = r#"{"type":"Notice","level":"warn","text":"kiosk mode requires device admin"}"#;
    let frame = decode_agent_frame(text).unwrap();
    assert!(matches!(
        frame,
        AgentToHost::Notice {
            level: NoticeLevel::Warn,
            ..
        }
    ));
}

#[test]
fn test_call_without_id_is_malformed() {
    let result = decode_host_frame(r#"{"type":"Call","method":"enableKioskMode"}"#);
    assert!(matches!(result, Err(CodecError::Malformed(_))));
}

#[test]
fn test_encode_refuses_frames_over_limit() {
    let notice = AgentToHost::Notice {
        level: NoticeLevel::Info,
        text: "x".repeat(MAX_FRAME_LEN),
    };
    assert!(matches!(
        encode_frame(&notice),
        Err(CodecError::TooLarge { .. })
    ));
}

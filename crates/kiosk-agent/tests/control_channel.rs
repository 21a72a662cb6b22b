//! Integration tests for the WebSocket control channel.
//!
//! Each test starts the real accept loop on an ephemeral loopback port,
//! connects with `tokio-tungstenite`, and exchanges JSON frames.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use kiosk_agent::application::{ControlSurface, DevicePorts};
use kiosk_agent::infrastructure::notify::MemoryNotifier;
use kiosk_agent::infrastructure::platform::{SimulatedDevice, SimulatedShell};
use kiosk_agent::infrastructure::serve;
use kiosk_core::domain::NoticeLevel;
use kiosk_core::{decode_agent_frame, AgentToHost, CallOutcome};
use serde_json::json;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Agent {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
}

impl Drop for Agent {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

async fn start_agent(device: SimulatedDevice) -> Agent {
    let device = Arc::new(device);
    let surface = ControlSurface::assemble(
        kiosk_core::AppIdentity::new("com.example.showcase"),
        DevicePorts {
            policy: device.clone(),
            lock_task: device.clone(),
            shell: Arc::new(SimulatedShell::new(device)),
            notifier: Arc::new(MemoryNotifier::new()),
        },
        false,
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let running = Arc::new(AtomicBool::new(true));
    tokio::spawn(serve(listener, Arc::new(surface), Arc::clone(&running)));

    Agent { addr, running }
}

async fn connect(agent: &Agent) -> Client {
    let (ws, _) = connect_async(format!("ws://{}", agent.addr))
        .await
        .expect("connect to control server");
    ws
}

async fn exchange(client: &mut Client, frame: serde_json::Value) -> AgentToHost {
    client
        .send(WsMessage::Text(frame.to_string()))
        .await
        .unwrap();
    next_frame(client).await
}

async fn next_frame(client: &mut Client) -> AgentToHost {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("reply within 5s")
            .expect("stream open")
            .expect("valid frame");
        if let WsMessage::Text(text) = msg {
            return decode_agent_frame(&text).expect("decodable reply");
        }
    }
}

async fn call(client: &mut Client, id: u64, method: &str) -> CallOutcome {
    match exchange(client, json!({"type": "Call", "id": id, "method": method})).await {
        AgentToHost::Reply { id: got, outcome } => {
            assert_eq!(got, id);
            outcome
        }
        other => panic!("expected Reply, got {other:?}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_enable_and_query_over_websocket() {
    // Arrange
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut client = connect(&agent).await;

    // Act
    let enabled = call(&mut client, 1, "enableKioskMode").await;
    let status = call(&mut client, 2, "isKioskModeEnabled").await;

    // Assert
    assert_eq!(enabled, CallOutcome::flag(true));
    assert_eq!(status, CallOutcome::flag(true));
}

#[tokio::test]
async fn test_check_permissions_returns_named_map() {
    let agent = start_agent(SimulatedDevice::new("com.example.showcase")).await;
    let mut client = connect(&agent).await;

    let outcome = call(&mut client, 9, "checkPermissions").await;

    match outcome {
        CallOutcome::Success { value } => {
            assert_eq!(
                value,
                json!({"isDeviceOwner": false, "isInLockTaskMode": false, "hasRootAccess": true})
            );
        }
        other => panic!("expected Success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_method_is_not_implemented_over_websocket() {
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut client = connect(&agent).await;

    let outcome = call(&mut client, 4, "wipeDevice").await;

    assert!(outcome.is_not_implemented());
}

#[tokio::test]
async fn test_malformed_frame_keeps_session_open() {
    // Arrange
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut client = connect(&agent).await;

    // Act
    client
        .send(WsMessage::Text("{\"type\":\"Nope\"}".into()))
        .await
        .unwrap();
    let error = next_frame(&mut client).await;
    let after = call(&mut client, 5, "isDeviceOwner").await;

    // Assert
    assert!(matches!(error, AgentToHost::ProtocolError { .. }));
    assert_eq!(after, CallOutcome::flag(true));
}

#[tokio::test]
async fn test_admin_disable_request_returns_warning_notice() {
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut client = connect(&agent).await;

    let reply = exchange(
        &mut client,
        json!({"type": "Admin", "event": {"kind": "disableRequested"}}),
    )
    .await;

    match reply {
        AgentToHost::Notice { level, text } => {
            assert_eq!(level, NoticeLevel::Warn);
            assert!(text.contains("device admin"));
        }
        other => panic!("expected Notice, got {other:?}"),
    }
}

#[tokio::test]
async fn test_back_pressed_reports_disposition() {
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut client = connect(&agent).await;
    assert_eq!(call(&mut client, 1, "enableKioskMode").await, CallOutcome::flag(true));

    let reply = exchange(
        &mut client,
        json!({"type": "Lifecycle", "event": "backPressed"}),
    )
    .await;

    assert_eq!(reply, AgentToHost::KeyDisposition { consumed: true });
}

#[tokio::test]
async fn test_two_sessions_share_one_controller() {
    // Arrange
    let agent = start_agent(SimulatedDevice::owned_by("com.example.showcase")).await;
    let mut first = connect(&agent).await;
    let mut second = connect(&agent).await;

    // Act
    assert_eq!(call(&mut first, 1, "enableKioskMode").await, CallOutcome::flag(true));
    let seen_by_second = call(&mut second, 1, "isKioskModeEnabled").await;

    // Assert
    assert_eq!(seen_by_second, CallOutcome::flag(true));
}

//! WebSocket control server: accept loop and per-session handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address (loopback by default).
//! 2. Accepting connections and upgrading each one to a WebSocket session.
//! 3. For every text frame: decoding a [`HostToAgent`] frame, handing it to
//!    the shared [`ControlSurface`], and writing the reply (if any) back.
//! 4. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Sessions
//!
//! Each session runs in its own Tokio task and gets a `uuid` session id that
//! appears in every log line about it.  Frames of one session are answered in
//! order; frames from different sessions run concurrently.  Serialization of
//! `enable`/`disable` happens inside the controller, not here.
//!
//! A frame that fails to decode does **not** end the session: the agent
//! answers with a `ProtocolError` frame and keeps reading.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use kiosk_core::{decode_host_frame, encode_frame, AgentToHost, HostToAgent};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message as WsMessage};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::ControlSurface;

/// How often the accept loop re-checks the `running` flag.
const ACCEPT_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `bind_addr` and serves control sessions until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (port in use,
/// missing permission).
pub async fn run_server(
    bind_addr: SocketAddr,
    surface: Arc<ControlSurface>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind control listener on {bind_addr}"))?;

    info!("control server listening on {bind_addr}");
    serve(listener, surface, running).await
}

/// Runs the accept loop on an already-bound listener.
///
/// Split out from [`run_server`] so tests can bind port 0 and read the
/// chosen address before serving.
pub async fn serve(
    listener: TcpListener,
    surface: Arc<ControlSurface>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let surface = Arc::clone(&surface);
                tokio::spawn(async move {
                    handle_session(stream, peer_addr, surface).await;
                });
            }
            Ok(Err(e)) => {
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection within the poll interval; re-check `running`.
            }
        }
    }

    Ok(())
}

/// Answers one text frame.
///
/// Decode failures become a `ProtocolError` reply; `None` means the frame
/// needs no reply.
pub async fn respond(surface: &ControlSurface, text: &str) -> Option<AgentToHost> {
    match decode_host_frame(text) {
        Ok(frame) => {
            log_frame(&frame);
            surface.handle(frame).await
        }
        Err(e) => {
            warn!("rejecting malformed frame: {e}");
            Some(AgentToHost::ProtocolError {
                message: e.to_string(),
            })
        }
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

async fn handle_session(stream: TcpStream, peer_addr: SocketAddr, surface: Arc<ControlSurface>) {
    let session_id = Uuid::new_v4();
    info!(%session_id, %peer_addr, "control connection accepted");
    match run_session(stream, session_id, surface).await {
        Ok(()) => info!(%session_id, "session closed normally"),
        Err(e) => warn!(%session_id, "session closed with error: {e:#}"),
    }
}

async fn run_session(
    stream: TcpStream,
    session_id: Uuid,
    surface: Arc<ControlSurface>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed for session {session_id}"))?;
    let (mut sink, mut source) = ws_stream.split();

    while let Some(message) = source.next().await {
        let message = message.with_context(|| format!("session {session_id}: read failed"))?;
        let reply = match message {
            WsMessage::Text(text) => respond(&surface, &text).await,
            WsMessage::Binary(_) => Some(AgentToHost::ProtocolError {
                message: "binary frames are not supported".to_string(),
            }),
            WsMessage::Close(_) => break,
            // Ping/Pong are answered by tungstenite itself.
            _ => None,
        };

        if let Some(reply) = reply {
            let text = encode_frame(&reply)
                .with_context(|| format!("session {session_id}: failed to encode reply"))?;
            sink.send(WsMessage::Text(text))
                .await
                .with_context(|| format!("session {session_id}: write failed"))?;
        }
    }

    Ok(())
}

fn log_frame(frame: &HostToAgent) {
    match frame {
        HostToAgent::Call { id, method } => debug!(id, method = method.as_str(), "call"),
        other => debug!(frame = ?other, "event"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

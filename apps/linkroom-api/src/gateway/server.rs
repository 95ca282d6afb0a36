//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use linkroom_common::id::{prefix, prefixed_ulid};
use tokio::sync::broadcast;
use tokio::time;

use crate::AppState;

use super::events::{
    AdminJoinPayload, ClientMessage, GatewayMessage, HeartbeatPayload, JoinRoomPayload,
    OP_ADMIN_JOIN, OP_HEARTBEAT, OP_JOIN_ROOM,
};
use super::fanout::BroadcastPayload;
use super::handler::{handle_admin_join, handle_join_room, HEARTBEAT_INTERVAL_MS};
use super::session::GatewaySession;

/// Close codes (4000-range for application-level).
const CLOSE_INVALID_PAYLOAD: u16 = 4000;
const CLOSE_UNKNOWN_OPCODE: u16 = 4001;
const CLOSE_AUTH_FAILED: u16 = 4004;
const CLOSE_SESSION_TIMEOUT: u16 = 4009;

type WsSink = SplitSink<WebSocket, Message>;
type WsStream = SplitStream<WebSocket>;

pub fn router() -> Router<AppState> {
    Router::new().route("/gateway", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, ws_rx) = socket.split();
    let session = Arc::new(GatewaySession::new(prefixed_ulid(prefix::CONNECTION)));

    // Subscribe before HELLO so nothing published after the handshake is missed.
    let broadcast_rx = state.broadcast.subscribe();

    let hello = GatewayMessage::hello(&session.connection_id, HEARTBEAT_INTERVAL_MS);
    if send_json(&mut ws_tx, &hello).await.is_err() {
        return;
    }
    tracing::info!(connection_id = %session.connection_id, "gateway connection opened");

    run_session(&state, session.clone(), ws_tx, ws_rx, broadcast_rx).await;

    tracing::info!(
        connection_id = %session.connection_id,
        channels = session.channel_count(),
        "gateway connection closed"
    );
}

/// Main event loop: read client messages, forward broadcasts, enforce heartbeat.
async fn run_session(
    state: &AppState,
    session: Arc<GatewaySession>,
    mut ws_tx: WsSink,
    mut ws_rx: WsStream,
    mut broadcast_rx: broadcast::Receiver<Arc<BroadcastPayload>>,
) {
    // Heartbeat deadline: client must heartbeat within 1.5x the interval.
    let heartbeat_deadline = Duration::from_millis(HEARTBEAT_INTERVAL_MS * 3 / 2);
    let mut heartbeat_timer = time::interval(heartbeat_deadline);
    heartbeat_timer.tick().await; // First tick fires immediately; skip it.
    let mut got_heartbeat = true;

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.connection_id, "ws read error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };

                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(_) => {
                        let _ = send_close(&mut ws_tx, CLOSE_INVALID_PAYLOAD, "Invalid JSON").await;
                        break;
                    }
                };

                let reply = match client_msg.op {
                    OP_HEARTBEAT => {
                        got_heartbeat = true;
                        let payload: HeartbeatPayload = serde_json::from_value(client_msg.d)
                            .unwrap_or(HeartbeatPayload { seq: 0 });
                        GatewayMessage::heartbeat_ack(payload.seq)
                    }
                    OP_JOIN_ROOM => {
                        let joined = serde_json::from_value::<JoinRoomPayload>(client_msg.d)
                            .map_err(|_| "Invalid JOIN_ROOM payload")
                            .and_then(|payload| handle_join_room(&session, payload));
                        match joined {
                            Ok(msg) => msg,
                            Err(reason) => {
                                let _ = send_close(&mut ws_tx, CLOSE_INVALID_PAYLOAD, reason).await;
                                break;
                            }
                        }
                    }
                    OP_ADMIN_JOIN => {
                        let Ok(payload) = serde_json::from_value::<AdminJoinPayload>(client_msg.d) else {
                            let _ = send_close(&mut ws_tx, CLOSE_INVALID_PAYLOAD, "Invalid ADMIN_JOIN payload").await;
                            break;
                        };
                        match handle_admin_join(state, &session, payload).await {
                            Ok(msg) => msg,
                            Err(reason) => {
                                tracing::debug!(%reason, connection_id = %session.connection_id, "admin join rejected");
                                let _ = send_close(&mut ws_tx, CLOSE_AUTH_FAILED, reason).await;
                                break;
                            }
                        }
                    }
                    _ => {
                        let _ = send_close(&mut ws_tx, CLOSE_UNKNOWN_OPCODE, "Unknown opcode").await;
                        break;
                    }
                };

                if send_json(&mut ws_tx, &reply).await.is_err() {
                    break;
                }
            }

            // Broadcast event from the fanout hub.
            result = broadcast_rx.recv() => {
                match result {
                    Ok(payload) => {
                        if !session.is_subscribed(&payload.channel) {
                            continue;
                        }

                        let seq = session.next_seq();
                        let msg = GatewayMessage::dispatch(&payload.event_name, seq, payload.data.clone());
                        if send_json(&mut ws_tx, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Missed events are dropped.
                        tracing::warn!(
                            connection_id = %session.connection_id,
                            skipped = n,
                            "gateway connection lagged behind broadcast"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            _ = heartbeat_timer.tick() => {
                if !got_heartbeat {
                    tracing::debug!(
                        connection_id = %session.connection_id,
                        "heartbeat timeout, closing connection"
                    );
                    let _ = send_close(&mut ws_tx, CLOSE_SESSION_TIMEOUT, "Heartbeat timeout").await;
                    break;
                }
                got_heartbeat = false;
            }
        }
    }
}

async fn send_json(ws_tx: &mut WsSink, msg: &GatewayMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    ws_tx.send(Message::Text(json.into())).await
}

/// Send a WebSocket close frame with a code and reason.
async fn send_close(ws_tx: &mut WsSink, code: u16, reason: &str) -> Result<(), axum::Error> {
    let close_msg = Message::Close(Some(axum::extract::ws::CloseFrame {
        code,
        reason: reason.to_string().into(),
    }));
    ws_tx.send(close_msg).await
}

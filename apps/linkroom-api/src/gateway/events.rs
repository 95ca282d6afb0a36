//! Gateway opcodes, event names and wire-format messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_JOIN_ROOM: u8 = 2;
pub const OP_ADMIN_JOIN: u8 = 3;
pub const OP_HEARTBEAT_ACK: u8 = 6;
pub const OP_HELLO: u8 = 10;

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayMessage {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    pub d: Value,
}

impl GatewayMessage {
    /// Build a DISPATCH message (op=0).
    pub fn dispatch(event_name: &str, seq: u64, data: Value) -> Self {
        Self {
            op: OP_DISPATCH,
            t: Some(event_name.to_string()),
            s: Some(seq),
            d: data,
        }
    }

    /// First frame on every connection.
    pub fn hello(connection_id: &str, heartbeat_interval_ms: u64) -> Self {
        Self {
            op: OP_HELLO,
            t: None,
            s: None,
            d: serde_json::json!({
                "connection_id": connection_id,
                "heartbeat_interval": heartbeat_interval_ms,
            }),
        }
    }

    /// Build a HEARTBEAT_ACK message (op=6).
    pub fn heartbeat_ack(seq: u64) -> Self {
        Self {
            op: OP_HEARTBEAT_ACK,
            t: None,
            s: None,
            d: serde_json::json!({ "ack": seq }),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatPayload {
    #[serde(default)]
    pub seq: u64,
}

/// JOIN_ROOM: start watching a room's links. No credentials needed.
#[derive(Debug, Deserialize)]
pub struct JoinRoomPayload {
    pub room: String,
}

/// ADMIN_JOIN: subscribe to the caller's private dashboard channel.
#[derive(Debug, Deserialize)]
pub struct AdminJoinPayload {
    pub ticket: String,
}

// ---------------------------------------------------------------------------
// Dispatch event types
// ---------------------------------------------------------------------------

/// Event names dispatched to clients.
pub struct EventName;

impl EventName {
    /// Acknowledges JOIN_ROOM and ADMIN_JOIN.
    pub const JOINED: &'static str = "joined";
    pub const LINK_ADDED: &'static str = "link_added";
    pub const LINK_UPDATED: &'static str = "link_updated";
    pub const LINK_DELETED: &'static str = "link_deleted";
    pub const ROOM_UPDATED: &'static str = "room_updated";
    pub const ROOM_DELETED: &'static str = "room_deleted";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_carries_event_name_and_sequence() {
        let msg = GatewayMessage::dispatch(EventName::LINK_ADDED, 3, serde_json::json!({"id": 1}));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, serde_json::json!({"op": 0, "t": "link_added", "s": 3, "d": {"id": 1}}));
    }

    #[test]
    fn control_frames_omit_t_and_s() {
        let value = serde_json::to_value(GatewayMessage::hello("gw_1", 30_000)).unwrap();
        assert_eq!(value["op"], 10);
        assert_eq!(value["d"]["heartbeat_interval"], 30_000);
        assert!(value.get("t").is_none());
        assert!(value.get("s").is_none());
    }

    #[test]
    fn client_message_defaults_missing_payload() {
        let msg: ClientMessage = serde_json::from_str(r#"{"op":1}"#).unwrap();
        assert_eq!(msg.op, OP_HEARTBEAT);
        assert!(msg.d.is_null());
    }
}

//! Broadcast hub for dispatching push events to connected gateway sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connection subscribes
//! once and filters payloads locally by the channel keys it has joined.
//! Delivery is best-effort: a payload published while nobody listens is
//! simply dropped.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// Addressable push channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    /// Public viewers of a room, keyed by normalized room name.
    Room(String),
    /// Every open dashboard of one admin user.
    Admin(i64),
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Room(name) => write!(f, "room:{name}"),
            ChannelKey::Admin(user_id) => write!(f, "admin-{user_id}"),
        }
    }
}

/// A payload broadcast to all connected gateway sessions.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// The channel this event is addressed to.
    pub channel: ChannelKey,
    /// The dispatch event name (e.g. "link_added").
    pub event_name: String,
    /// Serialized event data.
    pub data: Value,
}

/// The broadcast hub. Cloneable, stored in AppState.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl Default for GatewayBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway connection should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Publish an event. Returns how many connections were listening.
    pub fn dispatch(&self, payload: BroadcastPayload) -> usize {
        // send() errs when nobody is subscribed.
        self.sender.send(Arc::new(payload)).unwrap_or(0)
    }
}

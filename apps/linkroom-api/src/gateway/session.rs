//! Per-connection gateway state.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::fanout::ChannelKey;

/// State for a single WebSocket connection.
pub struct GatewaySession {
    /// Unique connection identifier (`gw_` prefixed ULID).
    pub connection_id: String,
    /// Channels joined so far. Grows with every JOIN_ROOM / ADMIN_JOIN.
    channels: Mutex<HashSet<ChannelKey>>,
    /// Monotonically increasing sequence number for dispatch events.
    seq: AtomicU64,
}

impl GatewaySession {
    pub fn new(connection_id: String) -> Self {
        Self {
            connection_id,
            channels: Mutex::new(HashSet::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// Returns `false` if the channel was already joined.
    pub fn join(&self, channel: ChannelKey) -> bool {
        self.channels.lock().insert(channel)
    }

    /// Get the next sequence number for a dispatch event.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn is_subscribed(&self, channel: &ChannelKey) -> bool {
        self.channels.lock().contains(channel)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }
}

//! Bearer sessions and single-use WebSocket tickets.

use linkroom_common::id::prefix;
use serde::{Deserialize, Serialize};

use crate::db::kv::KeyValueStore;
use crate::error::ApiError;

/// Generate an opaque random token with the given prefix.
pub fn generate_opaque_token(prefix: &str, bytes: usize) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill(&mut buf[..]);
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(&buf))
}

// ---------------------------------------------------------------------------
// Session token, TTL from config
// ---------------------------------------------------------------------------

/// Claims stored alongside a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
    pub is_super_admin: bool,
}

pub fn generate_session_token() -> String {
    generate_opaque_token(prefix::SESSION, 32)
}

fn session_key(token: &str) -> String {
    format!("linkroom:ses:{token}")
}

pub async fn store_session(
    kv: &dyn KeyValueStore,
    token: &str,
    data: &SessionData,
    ttl_secs: u64,
) -> Result<(), ApiError> {
    let value = serde_json::to_string(data).map_err(|_| ApiError::internal("serialization"))?;
    kv.set_ex(&session_key(token), &value, ttl_secs).await
}

pub async fn lookup_session(
    kv: &dyn KeyValueStore,
    token: &str,
) -> Result<Option<SessionData>, ApiError> {
    match kv.get(&session_key(token)).await? {
        Some(v) => {
            let data: SessionData =
                serde_json::from_str(&v).map_err(|_| ApiError::internal("corrupt session data"))?;
            Ok(Some(data))
        }
        None => Ok(None),
    }
}

pub async fn revoke_session(kv: &dyn KeyValueStore, token: &str) -> Result<(), ApiError> {
    kv.del(&session_key(token)).await
}

// ---------------------------------------------------------------------------
// WebSocket ticket, 30-second TTL, single-use
// ---------------------------------------------------------------------------

/// WS ticket TTL in seconds.
pub const WS_TICKET_TTL_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct WsTicketData {
    pub user_id: i64,
}

pub fn generate_ws_ticket() -> String {
    generate_opaque_token(prefix::WS_TICKET, 32)
}

fn ws_ticket_key(ticket: &str) -> String {
    format!("linkroom:wst:{ticket}")
}

pub async fn store_ws_ticket(
    kv: &dyn KeyValueStore,
    ticket: &str,
    data: &WsTicketData,
) -> Result<(), ApiError> {
    let value = serde_json::to_string(data).map_err(|_| ApiError::internal("serialization"))?;
    kv.set_ex(&ws_ticket_key(ticket), &value, WS_TICKET_TTL_SECS)
        .await
}

/// Look up and delete a ticket in one step.
pub async fn consume_ws_ticket(
    kv: &dyn KeyValueStore,
    ticket: &str,
) -> Result<Option<WsTicketData>, ApiError> {
    match kv.take(&ws_ticket_key(ticket)).await? {
        Some(v) => {
            let data: WsTicketData =
                serde_json::from_str(&v).map_err(|_| ApiError::internal("corrupt ticket data"))?;
            Ok(Some(data))
        }
        None => Ok(None),
    }
}

/// Issue a fresh ticket for `user_id` and return it.
pub async fn issue_ws_ticket(kv: &dyn KeyValueStore, user_id: i64) -> Result<String, ApiError> {
    let ticket = generate_ws_ticket();
    store_ws_ticket(kv, &ticket, &WsTicketData { user_id }).await?;
    Ok(ticket)
}

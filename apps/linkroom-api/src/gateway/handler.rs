//! Join opcodes: JOIN_ROOM and ADMIN_JOIN.

use linkroom_common::normalize_room_name;

use crate::auth::tokens;
use crate::AppState;

use super::events::{AdminJoinPayload, EventName, GatewayMessage, JoinRoomPayload};
use super::fanout::ChannelKey;
use super::session::GatewaySession;

/// Heartbeat interval announced in HELLO (ms).
pub const HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Subscribe the connection to a room's public channel.
pub fn handle_join_room(
    session: &GatewaySession,
    payload: JoinRoomPayload,
) -> Result<GatewayMessage, &'static str> {
    let room = normalize_room_name(&payload.room);
    if room.is_empty() {
        return Err("Room name is required");
    }

    session.join(ChannelKey::Room(room.clone()));
    tracing::debug!(connection_id = %session.connection_id, %room, "joined room channel");

    Ok(GatewayMessage::dispatch(
        EventName::JOINED,
        session.next_seq(),
        serde_json::json!({ "channel": ChannelKey::Room(room).to_string() }),
    ))
}

/// Consume a single-use ticket and subscribe the connection to its owner's
/// private channel.
pub async fn handle_admin_join(
    state: &AppState,
    session: &GatewaySession,
    payload: AdminJoinPayload,
) -> Result<GatewayMessage, &'static str> {
    let ticket = tokens::consume_ws_ticket(state.kv.as_ref(), &payload.ticket)
        .await
        .map_err(|_| "Ticket lookup failed")?
        .ok_or("Invalid or expired ticket")?;

    let channel = ChannelKey::Admin(ticket.user_id);
    session.join(channel.clone());
    tracing::info!(
        connection_id = %session.connection_id,
        user_id = ticket.user_id,
        "joined admin channel"
    );

    Ok(GatewayMessage::dispatch(
        EventName::JOINED,
        session.next_seq(),
        serde_json::json!({ "channel": channel.to_string(), "user_id": ticket.user_id }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::db::kv::MemoryStore;
    use crate::store::memory::MemoryRoomStore;

    fn state() -> AppState {
        AppState::new(
            Arc::new(MemoryRoomStore::new()),
            Arc::new(MemoryStore::new()),
            Config::in_memory(),
        )
    }

    #[test]
    fn join_room_normalizes_name() {
        let session = GatewaySession::new("gw_test".into());

        let msg = handle_join_room(
            &session,
            JoinRoomPayload {
                room: " Team-X ".into(),
            },
        )
        .unwrap();

        assert!(session.is_subscribed(&ChannelKey::Room("team-x".into())));
        assert_eq!(msg.t.as_deref(), Some(EventName::JOINED));
        assert_eq!(msg.d["channel"], "room:team-x");
    }

    #[test]
    fn join_room_rejects_blank_name() {
        let session = GatewaySession::new("gw_test".into());
        assert!(handle_join_room(&session, JoinRoomPayload { room: "  ".into() }).is_err());
        assert_eq!(session.channel_count(), 0);
    }

    #[tokio::test]
    async fn admin_join_consumes_ticket_once() {
        let state = state();
        let ticket = tokens::issue_ws_ticket(state.kv.as_ref(), 7).await.unwrap();
        let session = GatewaySession::new("gw_test".into());

        handle_admin_join(&state, &session, AdminJoinPayload { ticket: ticket.clone() })
            .await
            .unwrap();
        assert!(session.is_subscribed(&ChannelKey::Admin(7)));

        let again = GatewaySession::new("gw_other".into());
        let err = handle_admin_join(&state, &again, AdminJoinPayload { ticket })
            .await
            .unwrap_err();
        assert_eq!(err, "Invalid or expired ticket");
        assert_eq!(again.channel_count(), 0);
    }
}

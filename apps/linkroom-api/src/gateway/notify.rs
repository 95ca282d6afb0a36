//! Turns committed room/link changes into push events.
//!
//! Two audiences never overlap: room viewers only ever see link-level events,
//! admin dashboards only ever see room-level snapshots. The admin audience of
//! a room is its grant holders plus every super-admin.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::link::{Link, LinkWithRoom};
use crate::models::room::RoomSnapshot;
use crate::store::DynRoomStore;

use super::events::EventName;
use super::fanout::{BroadcastPayload, ChannelKey, GatewayBroadcast};

#[derive(Clone)]
pub struct Notifier {
    store: DynRoomStore,
    broadcast: GatewayBroadcast,
}

impl Notifier {
    pub fn new(store: DynRoomStore, broadcast: GatewayBroadcast) -> Self {
        Self { store, broadcast }
    }

    /// Grant holders united with every super-admin, ascending.
    ///
    /// Push is best-effort, so a failed super-admin lookup only narrows the
    /// audience instead of failing a mutation that already committed.
    pub async fn admin_audience(&self, permitted_user_ids: &[i64]) -> Vec<i64> {
        let mut audience: BTreeSet<i64> = permitted_user_ids.iter().copied().collect();
        match self.store.super_admin_ids().await {
            Ok(ids) => audience.extend(ids),
            Err(err) => {
                tracing::warn!(%err, "could not load super-admins for fan-out");
            }
        }
        audience.into_iter().collect()
    }

    /// Push a fresh snapshot to every admin with access to the room.
    pub async fn room_updated(&self, snapshot: &RoomSnapshot) {
        let audience = self.admin_audience(&snapshot.permitted_user_ids).await;
        for user_id in audience {
            self.publish(ChannelKey::Admin(user_id), EventName::ROOM_UPDATED, snapshot);
        }
    }

    /// Tell every admin in `permitted_user_ids` (captured before the delete)
    /// plus the super-admins that the room is gone.
    pub async fn room_deleted(&self, room_id: i64, permitted_user_ids: &[i64]) {
        let audience = self.admin_audience(permitted_user_ids).await;
        let data = serde_json::json!({ "room_id": room_id });
        for user_id in audience {
            self.publish(ChannelKey::Admin(user_id), EventName::ROOM_DELETED, &data);
        }
    }

    /// Remove a room from a single admin's view after their grant is revoked.
    pub fn room_removed_for(&self, user_id: i64, room_id: i64) {
        self.publish(
            ChannelKey::Admin(user_id),
            EventName::ROOM_DELETED,
            &serde_json::json!({ "room_id": room_id }),
        );
    }

    pub fn link_added(&self, room_name: &str, link: &Link) {
        self.publish(ChannelKey::Room(room_name.to_string()), EventName::LINK_ADDED, link);
    }

    pub fn link_updated(&self, link: &LinkWithRoom) {
        self.publish(
            ChannelKey::Room(link.room_name.clone()),
            EventName::LINK_UPDATED,
            link,
        );
    }

    pub fn link_deleted(&self, room_name: &str, link_id: i64) {
        self.publish(
            ChannelKey::Room(room_name.to_string()),
            EventName::LINK_DELETED,
            &serde_json::json!({ "id": link_id }),
        );
    }

    fn publish<T: Serialize + ?Sized>(&self, channel: ChannelKey, event_name: &str, data: &T) {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(%err, %channel, event_name, "failed to serialize push event");
                return;
            }
        };

        let listeners = self.broadcast.dispatch(BroadcastPayload {
            channel: channel.clone(),
            event_name: event_name.to_string(),
            data,
        });
        tracing::debug!(%channel, event_name, listeners, "push event published");
    }
}

//! Persistence provider for users, rooms, links and permission grants.
//!
//! `RoomStore` is the only way the rest of the crate touches stored state.
//! Backed by PostgreSQL in production and an in-process table set in tests.
//! Every method is a single atomic unit: the multi-statement ones
//! (`create_room` with its creator grant, `delete_room` with its cascade)
//! either fully apply or leave nothing behind.

pub mod memory;
pub mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::link::{Link, LinkChanges};
use crate::models::room::{Room, RoomSnapshot};
use crate::models::user::{User, UserSummary};

pub type Result<T> = std::result::Result<T, StoreError>;
pub type DynRoomStore = Arc<dyn RoomStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{resource} with {field} `{value}` already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    /// A referenced row doesn't exist.
    #[error("{resource} {id} doesn't exist")]
    NotFound { resource: &'static str, id: i64 },
    /// Connection, query or pool failure.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Internal(Box::new(err))
    }
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_super_admin: bool,
    ) -> Result<User>;
    /// Users without the super-admin role, ordered by id.
    async fn list_managers(&self) -> Result<Vec<UserSummary>>;
    async fn super_admin_ids(&self) -> Result<Vec<i64>>;

    /// Insert a room and, when `grant_creator` is set, a grant for its creator,
    /// in one transaction. `name` must already be normalized.
    async fn create_room(&self, name: &str, creator_id: i64, grant_creator: bool) -> Result<Room>;
    async fn room_by_id(&self, room_id: i64) -> Result<Option<Room>>;
    /// All rooms ordered by name.
    async fn list_rooms(&self) -> Result<Vec<Room>>;
    /// Rooms `user_id` holds a grant on, ordered by name.
    async fn list_rooms_for_user(&self, user_id: i64) -> Result<Vec<Room>>;
    /// Delete a room together with its links and grants. Returns whether a
    /// room was removed.
    async fn delete_room(&self, room_id: i64) -> Result<bool>;

    async fn has_grant(&self, room_id: i64, user_id: i64) -> Result<bool>;
    /// Grant holders for a room, ascending.
    async fn permitted_user_ids(&self, room_id: i64) -> Result<Vec<i64>>;
    /// Returns `false` when the grant already existed.
    async fn insert_grant(&self, room_id: i64, user_id: i64) -> Result<bool>;
    /// Returns `false` when there was no grant to delete.
    async fn delete_grant(&self, room_id: i64, user_id: i64) -> Result<bool>;

    /// Links of a room ordered by id.
    async fn links_for_room(&self, room_id: i64) -> Result<Vec<Link>>;
    /// Links of the room with this (normalized) name ordered by id. Empty when
    /// the room doesn't exist.
    async fn links_for_room_name(&self, room_name: &str) -> Result<Vec<Link>>;
    /// New links always start out `available`.
    async fn create_link(&self, room_id: i64, url: &str) -> Result<Link>;
    async fn link_by_id(&self, link_id: i64) -> Result<Option<Link>>;
    async fn update_link(&self, link_id: i64, changes: LinkChanges) -> Result<Option<Link>>;
    async fn delete_link(&self, link_id: i64) -> Result<bool>;

    /// Recompute the full view of a room, or `None` if it no longer exists.
    async fn room_snapshot(&self, room_id: i64) -> Result<Option<RoomSnapshot>> {
        let Some(room) = self.room_by_id(room_id).await? else {
            return Ok(None);
        };
        let links = self.links_for_room(room_id).await?;
        let permitted_user_ids = self.permitted_user_ids(room_id).await?;
        Ok(Some(RoomSnapshot::new(room, links, permitted_user_ids)))
    }
}

/// Open a store from a connection URI.
///
/// `memory:` gives a fresh in-process store; anything else is treated as a
/// PostgreSQL URL.
pub fn open(uri: &str, max_connections: usize) -> Result<DynRoomStore> {
    if uri.starts_with("memory:") {
        tracing::warn!("using in-memory store, state is lost on restart");
        return Ok(Arc::new(memory::MemoryRoomStore::new()));
    }

    let pool = crate::db::pool::connect(uri, max_connections).map_err(StoreError::internal)?;
    Ok(Arc::new(pg::PgRoomStore::new(pool)))
}

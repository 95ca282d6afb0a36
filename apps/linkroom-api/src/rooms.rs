//! Room and link state service.
//!
//! Every mutation follows the same shape: authorize, persist through the
//! injected `RoomStore`, recompute the affected snapshot, then hand the
//! committed result to the `Notifier`. Nothing is published when any earlier
//! step fails.

use linkroom_common::normalize_room_name;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::gateway::notify::Notifier;
use crate::models::link::{Link, LinkChanges, LinkStatus, LinkWithRoom};
use crate::models::room::RoomSnapshot;
use crate::models::user::UserSummary;
use crate::permissions::{require_room_access, require_super_admin, Principal};
use crate::store::{DynRoomStore, StoreError};

const MAX_ROOM_NAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("a room named `{0}` already exists")]
    DuplicateName(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(StoreError),
}

impl RoomError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<StoreError> for RoomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, .. } => RoomError::NotFound(match resource {
                "room" => "Room",
                "link" => "Link",
                "user" => "User",
                _ => "Resource",
            }),
            StoreError::Conflict {
                resource: "room",
                value,
                ..
            } => RoomError::DuplicateName(value),
            other => RoomError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoomError>;

/// A freshly created link with the room view it now belongs to.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub link: Link,
    pub snapshot: RoomSnapshot,
}

#[derive(Debug, Clone)]
pub struct UpdatedLink {
    pub link: LinkWithRoom,
    pub snapshot: RoomSnapshot,
}

/// Raw link update as it arrives from a client. `status` is checked against
/// the known values here, not at deserialization, so the caller gets a
/// field-level validation error.
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub url: Option<String>,
    pub status: Option<String>,
}

/// Everything an admin dashboard needs on load.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminData {
    pub rooms: Vec<RoomSnapshot>,
    /// Non-super-admin users, only populated for super-admins.
    pub users: Vec<UserSummary>,
    pub current_user_id: i64,
    pub is_super_admin: bool,
}

pub struct RoomService {
    store: DynRoomStore,
    notifier: Notifier,
}

impl RoomService {
    pub fn new(store: DynRoomStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn create_room(&self, name: &str, creator: &Principal) -> Result<RoomSnapshot> {
        let name = normalize_room_name(name);
        if name.is_empty() {
            return Err(RoomError::validation("name", "Room name is required"));
        }
        if name.chars().count() > MAX_ROOM_NAME_LEN {
            return Err(RoomError::validation(
                "name",
                format!("Room name must be at most {MAX_ROOM_NAME_LEN} characters"),
            ));
        }

        // Super-admins see every room already, so they get no grant row.
        let room = self
            .store
            .create_room(&name, creator.user_id, !creator.is_super_admin)
            .await?;

        let snapshot = self.snapshot(room.id).await?;
        tracing::info!(room_id = room.id, room = %room.name, creator_id = creator.user_id, "room created");

        self.notifier.room_updated(&snapshot).await;
        Ok(snapshot)
    }

    pub async fn delete_room(&self, room_id: i64, principal: &Principal) -> Result<()> {
        require_room_access(self.store.as_ref(), room_id, principal).await?;

        let audience = self.store.permitted_user_ids(room_id).await?;
        if !self.store.delete_room(room_id).await? {
            return Err(RoomError::NotFound("Room"));
        }
        tracing::info!(room_id, user_id = principal.user_id, "room deleted");

        self.notifier.room_deleted(room_id, &audience).await;
        Ok(())
    }

    pub async fn grant_permission(
        &self,
        room_id: i64,
        user_id: i64,
        granter: &Principal,
    ) -> Result<RoomSnapshot> {
        require_super_admin(granter)?;
        if self.store.room_by_id(room_id).await?.is_none() {
            return Err(RoomError::NotFound("Room"));
        }
        if self.store.user_by_id(user_id).await?.is_none() {
            return Err(RoomError::NotFound("User"));
        }

        let inserted = self.store.insert_grant(room_id, user_id).await?;
        let snapshot = self.snapshot(room_id).await?;

        if inserted {
            tracing::info!(room_id, user_id, granter_id = granter.user_id, "permission granted");
            self.notifier.room_updated(&snapshot).await;
        }
        Ok(snapshot)
    }

    /// Revoke a grant. Returns the remaining room view, or `None` when the
    /// room itself is gone.
    pub async fn revoke_permission(
        &self,
        room_id: i64,
        user_id: i64,
        granter: &Principal,
    ) -> Result<Option<RoomSnapshot>> {
        require_super_admin(granter)?;

        let removed = self.store.delete_grant(room_id, user_id).await?;
        let snapshot = self.store.room_snapshot(room_id).await?;
        tracing::info!(room_id, user_id, removed, granter_id = granter.user_id, "permission revoked");

        // A super-admin keeps seeing the room without the grant.
        let target_is_super_admin = self
            .store
            .user_by_id(user_id)
            .await?
            .is_some_and(|u| u.is_super_admin);
        if !target_is_super_admin {
            self.notifier.room_removed_for(user_id, room_id);
        }
        if let Some(snapshot) = &snapshot {
            self.notifier.room_updated(snapshot).await;
        }
        Ok(snapshot)
    }

    pub async fn create_link(
        &self,
        room_id: i64,
        url: &str,
        principal: &Principal,
    ) -> Result<CreatedLink> {
        require_room_access(self.store.as_ref(), room_id, principal).await?;
        let url = validate_url(url)?;

        let Some(room) = self.store.room_by_id(room_id).await? else {
            return Err(RoomError::NotFound("Room"));
        };
        let link = self.store.create_link(room_id, url).await?;
        let snapshot = self.snapshot(room_id).await?;
        tracing::info!(room_id, link_id = link.id, user_id = principal.user_id, "link created");

        self.notifier.link_added(&room.name, &link);
        self.notifier.room_updated(&snapshot).await;
        Ok(CreatedLink { link, snapshot })
    }

    pub async fn update_link(
        &self,
        link_id: i64,
        update: LinkUpdate,
        principal: &Principal,
    ) -> Result<UpdatedLink> {
        let existing = self.managed_link(link_id, principal).await?;

        let changes = LinkChanges {
            url: update
                .url
                .as_deref()
                .map(validate_url)
                .transpose()?
                .map(str::to_string),
            status: update
                .status
                .as_deref()
                .map(|s| {
                    s.parse::<LinkStatus>()
                        .map_err(|err| RoomError::validation("status", err.to_string()))
                })
                .transpose()?,
        };

        if changes.is_empty() {
            let snapshot = self.snapshot(existing.room_id).await?;
            let link = LinkWithRoom {
                link: existing,
                room_name: snapshot.name.clone(),
            };
            return Ok(UpdatedLink { link, snapshot });
        }

        let Some(link) = self.store.update_link(link_id, changes).await? else {
            return Err(RoomError::NotFound("Link"));
        };
        let snapshot = self.snapshot(link.room_id).await?;
        tracing::info!(link_id, room_id = link.room_id, status = %link.status, user_id = principal.user_id, "link updated");

        let link = LinkWithRoom {
            link,
            room_name: snapshot.name.clone(),
        };
        self.notifier.link_updated(&link);
        self.notifier.room_updated(&snapshot).await;
        Ok(UpdatedLink { link, snapshot })
    }

    pub async fn delete_link(&self, link_id: i64, principal: &Principal) -> Result<()> {
        let link = self.managed_link(link_id, principal).await?;

        if !self.store.delete_link(link_id).await? {
            return Err(RoomError::NotFound("Link"));
        }
        tracing::info!(link_id, room_id = link.room_id, user_id = principal.user_id, "link deleted");

        // The room can vanish between the delete and this read.
        if let Some(snapshot) = self.store.room_snapshot(link.room_id).await? {
            self.notifier.link_deleted(&snapshot.name, link_id);
            self.notifier.room_updated(&snapshot).await;
        }
        Ok(())
    }

    pub async fn admin_data(&self, principal: &Principal) -> Result<AdminData> {
        let (rooms, users) = if principal.is_super_admin {
            (
                self.store.list_rooms().await?,
                self.store.list_managers().await?,
            )
        } else {
            (
                self.store.list_rooms_for_user(principal.user_id).await?,
                Vec::new(),
            )
        };

        let mut snapshots = Vec::with_capacity(rooms.len());
        for room in rooms {
            let links = self.store.links_for_room(room.id).await?;
            let permitted = self.store.permitted_user_ids(room.id).await?;
            snapshots.push(RoomSnapshot::new(room, links, permitted));
        }

        Ok(AdminData {
            rooms: snapshots,
            users,
            current_user_id: principal.user_id,
            is_super_admin: principal.is_super_admin,
        })
    }

    /// Links visible to anonymous viewers of a room. Unknown rooms are empty.
    pub async fn public_links(&self, room_name: &str) -> Result<Vec<Link>> {
        let name = normalize_room_name(room_name);
        Ok(self.store.links_for_room_name(&name).await?)
    }

    /// Only super-admins learn that a link id doesn't exist; everyone else
    /// gets the same answer as for a room they can't manage.
    async fn managed_link(&self, link_id: i64, principal: &Principal) -> Result<Link> {
        match self.store.link_by_id(link_id).await? {
            Some(link) => {
                require_room_access(self.store.as_ref(), link.room_id, principal).await?;
                Ok(link)
            }
            None if principal.is_super_admin => Err(RoomError::NotFound("Link")),
            None => Err(RoomError::Forbidden(
                "You do not have permission to manage this room",
            )),
        }
    }

    async fn snapshot(&self, room_id: i64) -> Result<RoomSnapshot> {
        self.store
            .room_snapshot(room_id)
            .await?
            .ok_or(RoomError::NotFound("Room"))
    }
}

fn validate_url(url: &str) -> Result<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RoomError::validation("url", "Link URL is required"));
    }
    Ok(url)
}

//! In-process `RoomStore`.
//!
//! All tables live behind one mutex, so every method runs as a single
//! critical section. That gives the same all-or-nothing behaviour the
//! PostgreSQL store gets from transactions, including the cascades the SQL
//! schema declares.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::models::link::{Link, LinkChanges, LinkStatus};
use crate::models::room::Room;
use crate::models::user::{User, UserSummary};

use super::{Result, RoomStore, StoreError};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    rooms: BTreeMap<i64, Room>,
    links: BTreeMap<i64, Link>,
    /// (room_id, user_id)
    grants: BTreeSet<(i64, i64)>,
    next_user_id: i64,
    next_room_id: i64,
    next_link_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn sorted_by_name<'a>(rooms: impl Iterator<Item = &'a Room>) -> Vec<Room> {
        let mut list: Vec<Room> = rooms.cloned().collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

#[derive(Default)]
pub struct MemoryRoomStore {
    tables: Mutex<Tables>,
}

impl MemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryRoomStore {
    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().users.get(&user_id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock();
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_super_admin: bool,
    ) -> Result<User> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict {
                resource: "user",
                field: "username",
                value: username.to_string(),
            });
        }

        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_super_admin,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_managers(&self) -> Result<Vec<UserSummary>> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .filter(|u| !u.is_super_admin)
            .map(UserSummary::from)
            .collect())
    }

    async fn super_admin_ids(&self) -> Result<Vec<i64>> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .filter(|u| u.is_super_admin)
            .map(|u| u.id)
            .collect())
    }

    async fn create_room(&self, name: &str, creator_id: i64, grant_creator: bool) -> Result<Room> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&creator_id) {
            return Err(StoreError::NotFound {
                resource: "user",
                id: creator_id,
            });
        }
        if tables.rooms.values().any(|r| r.name == name) {
            return Err(StoreError::Conflict {
                resource: "room",
                field: "name",
                value: name.to_string(),
            });
        }

        let room = Room {
            id: Tables::next_id(&mut tables.next_room_id),
            name: name.to_string(),
            creator_id,
            created_at: Utc::now(),
        };
        tables.rooms.insert(room.id, room.clone());
        if grant_creator {
            tables.grants.insert((room.id, creator_id));
        }
        Ok(room)
    }

    async fn room_by_id(&self, room_id: i64) -> Result<Option<Room>> {
        Ok(self.tables.lock().rooms.get(&room_id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let tables = self.tables.lock();
        Ok(Tables::sorted_by_name(tables.rooms.values()))
    }

    async fn list_rooms_for_user(&self, user_id: i64) -> Result<Vec<Room>> {
        let tables = self.tables.lock();
        Ok(Tables::sorted_by_name(
            tables
                .rooms
                .values()
                .filter(|r| tables.grants.contains(&(r.id, user_id))),
        ))
    }

    async fn delete_room(&self, room_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock();
        if tables.rooms.remove(&room_id).is_none() {
            return Ok(false);
        }
        tables.links.retain(|_, link| link.room_id != room_id);
        tables.grants.retain(|(r, _)| *r != room_id);
        Ok(true)
    }

    async fn has_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.tables.lock().grants.contains(&(room_id, user_id)))
    }

    async fn permitted_user_ids(&self, room_id: i64) -> Result<Vec<i64>> {
        let tables = self.tables.lock();
        Ok(tables
            .grants
            .range((room_id, i64::MIN)..=(room_id, i64::MAX))
            .map(|(_, user_id)| *user_id)
            .collect())
    }

    async fn insert_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock();
        if !tables.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound {
                resource: "room",
                id: room_id,
            });
        }
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::NotFound {
                resource: "user",
                id: user_id,
            });
        }
        Ok(tables.grants.insert((room_id, user_id)))
    }

    async fn delete_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.tables.lock().grants.remove(&(room_id, user_id)))
    }

    async fn links_for_room(&self, room_id: i64) -> Result<Vec<Link>> {
        let tables = self.tables.lock();
        Ok(tables
            .links
            .values()
            .filter(|l| l.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn links_for_room_name(&self, room_name: &str) -> Result<Vec<Link>> {
        let tables = self.tables.lock();
        let Some(room_id) = tables
            .rooms
            .values()
            .find(|r| r.name == room_name)
            .map(|r| r.id)
        else {
            return Ok(Vec::new());
        };
        Ok(tables
            .links
            .values()
            .filter(|l| l.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn create_link(&self, room_id: i64, url: &str) -> Result<Link> {
        let mut tables = self.tables.lock();
        if !tables.rooms.contains_key(&room_id) {
            return Err(StoreError::NotFound {
                resource: "room",
                id: room_id,
            });
        }

        let link = Link {
            id: Tables::next_id(&mut tables.next_link_id),
            room_id,
            url: url.to_string(),
            status: LinkStatus::Available,
            created_at: Utc::now(),
        };
        tables.links.insert(link.id, link.clone());
        Ok(link)
    }

    async fn link_by_id(&self, link_id: i64) -> Result<Option<Link>> {
        Ok(self.tables.lock().links.get(&link_id).cloned())
    }

    async fn update_link(&self, link_id: i64, changes: LinkChanges) -> Result<Option<Link>> {
        let mut tables = self.tables.lock();
        let Some(link) = tables.links.get_mut(&link_id) else {
            return Ok(None);
        };
        if let Some(url) = changes.url {
            link.url = url;
        }
        if let Some(status) = changes.status {
            link.status = status;
        }
        Ok(Some(link.clone()))
    }

    async fn delete_link(&self, link_id: i64) -> Result<bool> {
        Ok(self.tables.lock().links.remove(&link_id).is_some())
    }
}

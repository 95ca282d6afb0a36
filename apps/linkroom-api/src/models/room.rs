use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::rooms;
use crate::models::link::Link;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = rooms)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoom<'a> {
    pub name: &'a str,
    pub creator_id: i64,
}

/// Full materialized view of a room, sent to admins with access to it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RoomSnapshot {
    pub id: i64,
    pub name: String,
    pub creator_id: i64,
    /// Ordered by link id.
    pub links: Vec<Link>,
    /// Users holding a grant on this room, ascending. Super-admins are implicit
    /// and never listed.
    pub permitted_user_ids: Vec<i64>,
}

impl RoomSnapshot {
    pub fn new(room: Room, links: Vec<Link>, permitted_user_ids: Vec<i64>) -> Self {
        Self {
            id: room.id,
            name: room.name,
            creator_id: room.creator_id,
            links,
            permitted_user_ids,
        }
    }
}

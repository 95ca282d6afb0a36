use diesel::prelude::*;

use crate::db::schema::room_permissions;

/// A grant letting `user_id` manage `room_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Queryable, Selectable, Insertable)]
#[diesel(table_name = room_permissions)]
pub struct RoomPermission {
    pub user_id: i64,
    pub room_id: i64,
}

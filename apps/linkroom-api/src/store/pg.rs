//! PostgreSQL `RoomStore` on top of diesel-async.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError, OptionalExtension};
use diesel_async::AsyncConnection;
use scoped_futures::ScopedFutureExt;

use crate::db::pool::DbPool;
use crate::db::schema::{links, room_permissions, rooms, users};
use crate::models::link::{Link, LinkChanges, LinkStatus, NewLink};
use crate::models::permission::RoomPermission;
use crate::models::room::{NewRoom, Room};
use crate::models::user::{NewUser, User, UserSummary};

use super::{Result, RoomStore, StoreError};

pub struct PgRoomStore {
    pool: DbPool,
}

impl PgRoomStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<diesel_async::pooled_connection::deadpool::Object<diesel_async::AsyncPgConnection>>
    {
        self.pool.get().await.map_err(|err| {
            tracing::error!(?err, "pool error");
            StoreError::internal(err)
        })
    }
}

/// Maps constraint violations onto the store's error vocabulary.
trait IntoStoreError {
    fn into_store_error(self, resource: &'static str, field: &'static str, value: String)
        -> StoreError;
}

impl IntoStoreError for DieselError {
    fn into_store_error(
        self,
        resource: &'static str,
        field: &'static str,
        value: String,
    ) -> StoreError {
        match self {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::Conflict {
                    resource,
                    field,
                    value,
                }
            }
            err => internal(err),
        }
    }
}

fn internal(err: DieselError) -> StoreError {
    tracing::error!(?err, "database error");
    StoreError::internal(err)
}

fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            users::table.find(user_id).select(User::as_select()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(internal)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            users::table
                .filter(users::username.eq(username))
                .select(User::as_select()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(internal)
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        is_super_admin: bool,
    ) -> Result<User> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(users::table)
                .values(NewUser {
                    username,
                    password_hash,
                    is_super_admin,
                })
                .returning(User::as_returning()),
            &mut conn,
        )
        .await
        .map_err(|e| e.into_store_error("user", "username", username.to_string()))
    }

    async fn list_managers(&self) -> Result<Vec<UserSummary>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            users::table
                .filter(users::is_super_admin.eq(false))
                .order(users::id.asc())
                .select(UserSummary::as_select()),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn super_admin_ids(&self) -> Result<Vec<i64>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            users::table
                .filter(users::is_super_admin.eq(true))
                .order(users::id.asc())
                .select(users::id),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn create_room(&self, name: &str, creator_id: i64, grant_creator: bool) -> Result<Room> {
        let mut conn = self.conn().await?;
        let room_name = name.to_string();

        let result = conn
            .transaction::<_, DieselError, _>(|conn| {
                async move {
                    // 1. Insert the room.
                    let room: Room = diesel_async::RunQueryDsl::get_result(
                        diesel::insert_into(rooms::table)
                            .values(NewRoom {
                                name: &room_name,
                                creator_id,
                            })
                            .returning(Room::as_returning()),
                        conn,
                    )
                    .await?;

                    // 2. Grant the creator access to it.
                    if grant_creator {
                        diesel_async::RunQueryDsl::execute(
                            diesel::insert_into(room_permissions::table).values(RoomPermission {
                                user_id: creator_id,
                                room_id: room.id,
                            }),
                            conn,
                        )
                        .await?;
                    }

                    Ok(room)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(room) => Ok(room),
            Err(err) if is_foreign_key_violation(&err) => Err(StoreError::NotFound {
                resource: "user",
                id: creator_id,
            }),
            Err(err) => Err(err.into_store_error("room", "name", name.to_string())),
        }
    }

    async fn room_by_id(&self, room_id: i64) -> Result<Option<Room>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            rooms::table.find(room_id).select(Room::as_select()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(internal)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            rooms::table
                .order(rooms::name.asc())
                .select(Room::as_select()),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn list_rooms_for_user(&self, user_id: i64) -> Result<Vec<Room>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            rooms::table
                .inner_join(room_permissions::table)
                .filter(room_permissions::user_id.eq(user_id))
                .order(rooms::name.asc())
                .select(Room::as_select()),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn delete_room(&self, room_id: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        // Links and grants go with it through ON DELETE CASCADE.
        let affected = diesel_async::RunQueryDsl::execute(
            diesel::delete(rooms::table.find(room_id)),
            &mut conn,
        )
        .await
        .map_err(internal)?;
        Ok(affected > 0)
    }

    async fn has_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        let count: i64 = diesel_async::RunQueryDsl::get_result(
            room_permissions::table
                .filter(room_permissions::room_id.eq(room_id))
                .filter(room_permissions::user_id.eq(user_id))
                .count(),
            &mut conn,
        )
        .await
        .map_err(internal)?;
        Ok(count > 0)
    }

    async fn permitted_user_ids(&self, room_id: i64) -> Result<Vec<i64>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            room_permissions::table
                .filter(room_permissions::room_id.eq(room_id))
                .order(room_permissions::user_id.asc())
                .select(room_permissions::user_id),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn insert_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        let inserted = diesel_async::RunQueryDsl::execute(
            diesel::insert_into(room_permissions::table)
                .values(RoomPermission { user_id, room_id })
                .on_conflict_do_nothing(),
            &mut conn,
        )
        .await;

        match inserted {
            Ok(rows) => Ok(rows > 0),
            // Either side of the pair is missing; the room is the usual culprit.
            Err(err) if is_foreign_key_violation(&err) => Err(StoreError::NotFound {
                resource: "room",
                id: room_id,
            }),
            Err(err) => Err(internal(err)),
        }
    }

    async fn delete_grant(&self, room_id: i64, user_id: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        let affected = diesel_async::RunQueryDsl::execute(
            diesel::delete(room_permissions::table.find((user_id, room_id))),
            &mut conn,
        )
        .await
        .map_err(internal)?;
        Ok(affected > 0)
    }

    async fn links_for_room(&self, room_id: i64) -> Result<Vec<Link>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            links::table
                .filter(links::room_id.eq(room_id))
                .order(links::id.asc())
                .select(Link::as_select()),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn links_for_room_name(&self, room_name: &str) -> Result<Vec<Link>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::load(
            links::table
                .inner_join(rooms::table)
                .filter(rooms::name.eq(room_name))
                .order(links::id.asc())
                .select(Link::as_select()),
            &mut conn,
        )
        .await
        .map_err(internal)
    }

    async fn create_link(&self, room_id: i64, url: &str) -> Result<Link> {
        let mut conn = self.conn().await?;
        let created = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(links::table)
                .values(NewLink {
                    room_id,
                    url,
                    status: LinkStatus::Available,
                })
                .returning(Link::as_returning()),
            &mut conn,
        )
        .await;

        match created {
            Ok(link) => Ok(link),
            Err(err) if is_foreign_key_violation(&err) => Err(StoreError::NotFound {
                resource: "room",
                id: room_id,
            }),
            Err(err) => Err(internal(err)),
        }
    }

    async fn link_by_id(&self, link_id: i64) -> Result<Option<Link>> {
        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            links::table.find(link_id).select(Link::as_select()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(internal)
    }

    async fn update_link(&self, link_id: i64, changes: LinkChanges) -> Result<Option<Link>> {
        // An empty changeset is a query builder error in diesel.
        if changes.is_empty() {
            return self.link_by_id(link_id).await;
        }

        let mut conn = self.conn().await?;
        diesel_async::RunQueryDsl::get_result(
            diesel::update(links::table.find(link_id))
                .set(&changes)
                .returning(Link::as_returning()),
            &mut conn,
        )
        .await
        .optional()
        .map_err(internal)
    }

    async fn delete_link(&self, link_id: i64) -> Result<bool> {
        let mut conn = self.conn().await?;
        let affected = diesel_async::RunQueryDsl::execute(
            diesel::delete(links::table.find(link_id)),
            &mut conn,
        )
        .await
        .map_err(internal)?;
        Ok(affected > 0)
    }
}

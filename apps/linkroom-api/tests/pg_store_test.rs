//! `PgRoomStore` against a real PostgreSQL database.
//!
//! Uses the `_test` sibling of `DATABASE_URL` (the database
//! `linkroom-migrate --test` targets) and applies pending migrations once per
//! run. Skipped when `DATABASE_URL` is unset or points at the in-memory store.

use std::path::Path;
use std::sync::Once;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use linkroom_api::db::pool;
use linkroom_api::models::link::{LinkChanges, LinkStatus};
use linkroom_api::models::user::User;
use linkroom_api::store::pg::PgRoomStore;
use linkroom_api::store::{RoomStore, StoreError};
use linkroom_common::prefixed_ulid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

static MIGRATED: Once = Once::new();

fn test_database_url() -> Option<String> {
    let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(env_path);

    let database_url = std::env::var("DATABASE_URL").ok()?;
    if database_url.starts_with("memory:") {
        return None;
    }
    Some(with_test_db_suffix(&database_url))
}

fn with_test_db_suffix(database_url: &str) -> String {
    let mut parts = database_url.splitn(2, '?');
    let base = parts.next().unwrap_or(database_url);
    let query = parts.next();

    let mut base_parts = base.rsplitn(2, '/');
    let db_name = base_parts.next().unwrap_or("");
    let prefix = base_parts.next().unwrap_or("");

    if db_name.is_empty() || db_name.ends_with("_test") {
        return database_url.to_string();
    }

    let mut updated = format!("{prefix}/{db_name}_test");
    if let Some(query) = query {
        updated.push('?');
        updated.push_str(query);
    }
    updated
}

async fn pg_store() -> Option<PgRoomStore> {
    let Some(database_url) = test_database_url() else {
        eprintln!("DATABASE_URL not set to PostgreSQL, skipping");
        return None;
    };

    MIGRATED.call_once(|| {
        let mut conn =
            PgConnection::establish(&database_url).expect("failed to connect to test database");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
    });

    let pool = pool::connect(&database_url, 2).expect("build pool");
    Some(PgRoomStore::new(pool))
}

/// Tests share one database, so every row they create gets a fresh name.
fn unique(label: &str) -> String {
    prefixed_ulid(label).to_lowercase()
}

async fn new_user(store: &PgRoomStore, is_super_admin: bool) -> User {
    store
        .create_user(&unique("user"), "hash", is_super_admin)
        .await
        .unwrap()
}

#[tokio::test]
async fn create_room_writes_exactly_one_creator_grant() {
    let Some(store) = pg_store().await else { return };
    let user = new_user(&store, false).await;
    let name = unique("room");

    let room = store.create_room(&name, user.id, true).await.unwrap();

    assert_eq!(room.name, name);
    assert_eq!(room.creator_id, user.id);
    assert_eq!(store.permitted_user_ids(room.id).await.unwrap(), vec![user.id]);
    let rooms = store.list_rooms_for_user(user.id).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, room.id);
}

#[tokio::test]
async fn create_room_without_creator_grant() {
    let Some(store) = pg_store().await else { return };
    let root = new_user(&store, true).await;

    let room = store.create_room(&unique("room"), root.id, false).await.unwrap();

    assert!(store.permitted_user_ids(room.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_room_name_conflicts_and_leaves_nothing_behind() {
    let Some(store) = pg_store().await else { return };
    let alice = new_user(&store, false).await;
    let bob = new_user(&store, false).await;
    let name = unique("room");
    store.create_room(&name, alice.id, true).await.unwrap();

    let err = store.create_room(&name, bob.id, true).await.unwrap_err();

    assert!(matches!(
        err,
        StoreError::Conflict {
            resource: "room",
            field: "name",
            ..
        }
    ));
    assert!(store.list_rooms_for_user(bob.id).await.unwrap().is_empty());
    let same_name = store
        .list_rooms()
        .await
        .unwrap()
        .into_iter()
        .filter(|room| room.name == name)
        .count();
    assert_eq!(same_name, 1);
}

#[tokio::test]
async fn create_room_for_unknown_creator_is_not_found() {
    let Some(store) = pg_store().await else { return };

    let err = store
        .create_room(&unique("room"), i64::MAX, true)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { resource: "user", .. }));
}

#[tokio::test]
async fn repeated_grant_inserts_once() {
    let Some(store) = pg_store().await else { return };
    let root = new_user(&store, true).await;
    let alice = new_user(&store, false).await;
    let room = store.create_room(&unique("room"), root.id, false).await.unwrap();

    assert!(store.insert_grant(room.id, alice.id).await.unwrap());
    assert!(!store.insert_grant(room.id, alice.id).await.unwrap());
    assert_eq!(store.permitted_user_ids(room.id).await.unwrap(), vec![alice.id]);

    assert!(store.delete_grant(room.id, alice.id).await.unwrap());
    assert!(!store.delete_grant(room.id, alice.id).await.unwrap());
    assert!(!store.has_grant(room.id, alice.id).await.unwrap());
}

#[tokio::test]
async fn delete_room_cascades_links_and_grants() {
    let Some(store) = pg_store().await else { return };
    let alice = new_user(&store, false).await;
    let name = unique("room");
    let room = store.create_room(&name, alice.id, true).await.unwrap();
    let link = store.create_link(room.id, "https://a.b").await.unwrap();

    assert!(store.delete_room(room.id).await.unwrap());

    assert!(store.room_by_id(room.id).await.unwrap().is_none());
    assert!(store.link_by_id(link.id).await.unwrap().is_none());
    assert!(!store.has_grant(room.id, alice.id).await.unwrap());
    assert!(store.links_for_room_name(&name).await.unwrap().is_empty());
    assert!(!store.delete_room(room.id).await.unwrap());
}

#[tokio::test]
async fn link_status_round_trips_through_text_column() {
    let Some(store) = pg_store().await else { return };
    let alice = new_user(&store, false).await;
    let name = unique("room");
    let room = store.create_room(&name, alice.id, true).await.unwrap();
    let link = store.create_link(room.id, "https://a.b").await.unwrap();
    assert_eq!(link.status, LinkStatus::Available);

    let updated = store
        .update_link(
            link.id,
            LinkChanges {
                url: None,
                status: Some(LinkStatus::Full),
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, LinkStatus::Full);
    assert_eq!(updated.url, "https://a.b");
    let reloaded = store.link_by_id(link.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, LinkStatus::Full);
    let listed = store.links_for_room_name(&name).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, LinkStatus::Full);
}

#[tokio::test]
async fn room_snapshot_orders_links_and_grants() {
    let Some(store) = pg_store().await else { return };
    let alice = new_user(&store, false).await;
    let bob = new_user(&store, false).await;
    let room = store.create_room(&unique("room"), bob.id, true).await.unwrap();
    store.insert_grant(room.id, alice.id).await.unwrap();
    let first = store.create_link(room.id, "https://one").await.unwrap();
    let second = store.create_link(room.id, "https://two").await.unwrap();

    let snapshot = store.room_snapshot(room.id).await.unwrap().unwrap();

    let link_ids: Vec<i64> = snapshot.links.iter().map(|link| link.id).collect();
    assert_eq!(link_ids, vec![first.id, second.id]);
    assert_eq!(snapshot.permitted_user_ids, vec![alice.id, bob.id]);
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;

use linkroom_api::auth::password::hash_password;
use linkroom_api::config::Config;
use linkroom_api::db::kv::{KeyValueStore, MemoryStore};
use linkroom_api::models::user::User;
use linkroom_api::store::memory::MemoryRoomStore;
use linkroom_api::AppState;

pub const PASSWORD: &str = "correct horse battery staple";

/// Build a test AppState on the in-memory store and KV.
pub fn test_state() -> AppState {
    let store = Arc::new(MemoryRoomStore::new());
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    AppState::new(store, kv, Config::in_memory())
}

/// Build the full application router wired to a fresh test state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = linkroom_api::routes::router().with_state(state.clone());
    (app, state)
}

pub fn test_server() -> (TestServer, AppState) {
    let (app, state) = test_app();
    (TestServer::new(app).unwrap(), state)
}

/// Create a user whose password is [`PASSWORD`].
pub async fn create_user(state: &AppState, username: &str, is_super_admin: bool) -> User {
    let hash = hash_password(PASSWORD).unwrap();
    state
        .store
        .create_user(username, &hash, is_super_admin)
        .await
        .unwrap()
}

/// Login through the API and return the access token.
pub async fn login(server: &TestServer, username: &str) -> String {
    let resp = server
        .post("/api/auth/login")
        .json(&serde_json::json!({ "username": username, "password": PASSWORD }))
        .await;
    resp.assert_status_ok();
    resp.json::<serde_json::Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create a user and log them in.
pub async fn create_and_login(
    server: &TestServer,
    state: &AppState,
    username: &str,
    is_super_admin: bool,
) -> (User, String) {
    let user = create_user(state, username, is_super_admin).await;
    let token = login(server, username).await;
    (user, token)
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Create a room through the API and return its id.
pub async fn create_room(server: &TestServer, token: &str, name: &str) -> i64 {
    let resp = server
        .post("/api/rooms")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&serde_json::json!({ "name": name }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

/// Create a link through the API and return its id.
pub async fn create_link(server: &TestServer, token: &str, room_id: i64, url: &str) -> i64 {
    let resp = server
        .post("/api/links")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&serde_json::json!({ "room_id": room_id, "url": url }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<serde_json::Value>()["id"].as_i64().unwrap()
}

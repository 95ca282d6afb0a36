mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;

// ---------------------------------------------------------------------------
// POST /api/rooms
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_room_returns_snapshot_with_creator_grant() {
    let (server, state) = common::test_server();
    let (alice, token) = common::create_and_login(&server, &state, "alice", false).await;

    let resp = server
        .post("/api/rooms")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({ "name": "  Team-X " }))
        .await;

    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["name"], "team-x");
    assert_eq!(body["creator_id"], alice.id);
    assert_eq!(body["links"], serde_json::json!([]));
    assert_eq!(body["permitted_user_ids"], serde_json::json!([alice.id]));
}

#[tokio::test]
async fn create_room_validates_name() {
    let (server, state) = common::test_server();
    let (_, token) = common::create_and_login(&server, &state, "alice", false).await;

    let resp = server
        .post("/api/rooms")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({ "name": "   " }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "name");
}

#[tokio::test]
async fn duplicate_room_name_conflicts() {
    let (server, state) = common::test_server();
    let (_, token) = common::create_and_login(&server, &state, "alice", false).await;
    common::create_room(&server, &token, "team-x").await;

    let resp = server
        .post("/api/rooms")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .json(&serde_json::json!({ "name": "TEAM-X" }))
        .await;

    resp.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// DELETE /api/rooms/:id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_room_requires_access() {
    let (server, state) = common::test_server();
    let (_, alice) = common::create_and_login(&server, &state, "alice", false).await;
    let (_, bob) = common::create_and_login(&server, &state, "bob", false).await;
    let room_id = common::create_room(&server, &alice, "team-x").await;

    server
        .delete(&format!("/api/rooms/{room_id}"))
        .add_header(AUTHORIZATION, common::bearer(&bob))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .delete(&format!("/api/rooms/{room_id}"))
        .add_header(AUTHORIZATION, common::bearer(&alice))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn delete_room_cascades_links() {
    let (server, state) = common::test_server();
    let (_, root) = common::create_and_login(&server, &state, "root", true).await;
    let room_id = common::create_room(&server, &root, "team-x").await;
    common::create_link(&server, &root, room_id, "https://a.b").await;

    server
        .delete(&format!("/api/rooms/{room_id}"))
        .add_header(AUTHORIZATION, common::bearer(&root))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let links: serde_json::Value = server.get("/api/rooms/team-x/links").await.json();
    assert_eq!(links, serde_json::json!([]));

    server
        .delete(&format!("/api/rooms/{room_id}"))
        .add_header(AUTHORIZATION, common::bearer(&root))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// GET /api/rooms/:room_name/links
// ---------------------------------------------------------------------------

#[tokio::test]
async fn public_links_for_unknown_room_is_empty() {
    let (server, _state) = common::test_server();

    let resp = server.get("/api/rooms/nowhere/links").await;

    resp.assert_status_ok();
    resp.assert_json(&serde_json::json!([]));
}

#[tokio::test]
async fn public_links_are_ordered_by_id_and_case_insensitive() {
    let (server, state) = common::test_server();
    let (_, token) = common::create_and_login(&server, &state, "alice", false).await;
    let room_id = common::create_room(&server, &token, "team-x").await;
    let first = common::create_link(&server, &token, room_id, "https://one").await;
    let second = common::create_link(&server, &token, room_id, "https://two").await;

    let links: serde_json::Value = server.get("/api/rooms/Team-X/links").await.json();

    assert_eq!(links[0]["id"], first);
    assert_eq!(links[1]["id"], second);
    assert_eq!(links[0]["status"], "available");
}

// ---------------------------------------------------------------------------
// GET /api/admin/data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_data_for_super_admin_lists_everything() {
    let (server, state) = common::test_server();
    let (_, root) = common::create_and_login(&server, &state, "root", true).await;
    let (alice, alice_token) = common::create_and_login(&server, &state, "alice", false).await;
    common::create_room(&server, &alice_token, "zulu").await;
    common::create_room(&server, &root, "alpha").await;

    let body: serde_json::Value = server
        .get("/api/admin/data")
        .add_header(AUTHORIZATION, common::bearer(&root))
        .await
        .json();

    assert_eq!(body["is_super_admin"], true);
    assert_eq!(body["rooms"][0]["name"], "alpha");
    assert_eq!(body["rooms"][1]["name"], "zulu");
    assert_eq!(
        body["users"],
        serde_json::json!([{ "id": alice.id, "username": "alice" }])
    );
}

#[tokio::test]
async fn admin_data_for_manager_lists_granted_rooms_only() {
    let (server, state) = common::test_server();
    let (alice, alice_token) = common::create_and_login(&server, &state, "alice", false).await;
    let (_, bob_token) = common::create_and_login(&server, &state, "bob", false).await;
    common::create_room(&server, &alice_token, "mine").await;
    common::create_room(&server, &bob_token, "theirs").await;

    let body: serde_json::Value = server
        .get("/api/admin/data")
        .add_header(AUTHORIZATION, common::bearer(&alice_token))
        .await
        .json();

    assert_eq!(body["current_user_id"], alice.id);
    assert_eq!(body["is_super_admin"], false);
    assert_eq!(body["rooms"].as_array().unwrap().len(), 1);
    assert_eq!(body["rooms"][0]["name"], "mine");
    assert_eq!(body["users"], serde_json::json!([]));
}

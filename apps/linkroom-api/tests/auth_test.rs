mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_session_ticket_and_user() {
    let (server, state) = common::test_server();
    let user = common::create_user(&state, "alice", false).await;

    let resp = server
        .post("/api/auth/login")
        .json(&serde_json::json!({ "username": "alice", "password": common::PASSWORD }))
        .await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert!(body["access_token"].as_str().unwrap().starts_with("ses_"));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], state.config.session_ttl_secs);
    assert!(body["ws_ticket"].as_str().unwrap().starts_with("wst_"));
    assert_eq!(body["user"]["id"], user.id);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["is_super_admin"], false);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (server, state) = common::test_server();
    common::create_user(&state, "alice", false).await;

    let resp = server
        .post("/api/auth/login")
        .json(&serde_json::json!({ "username": "alice", "password": "nope" }))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_rejects_unknown_user() {
    let (server, _state) = common::test_server();

    let resp = server
        .post("/api/auth/login")
        .json(&serde_json::json!({ "username": "ghost", "password": "x" }))
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Bearer handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_route_requires_bearer() {
    let (server, _state) = common::test_server();

    let resp = server.get("/api/admin/data").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let resp = server
        .get("/api/admin/data")
        .add_header(AUTHORIZATION, common::bearer("ses_bogus"))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (server, state) = common::test_server();
    let (_, token) = common::create_and_login(&server, &state, "alice", false).await;

    server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get("/api/admin/data")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn ws_ticket_endpoint_issues_fresh_tickets() {
    let (server, state) = common::test_server();
    let (_, token) = common::create_and_login(&server, &state, "alice", false).await;

    let first: serde_json::Value = server
        .post("/api/auth/ws-ticket")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await
        .json();
    let second: serde_json::Value = server
        .post("/api/auth/ws-ticket")
        .add_header(AUTHORIZATION, common::bearer(&token))
        .await
        .json();

    assert!(first["ws_ticket"].as_str().unwrap().starts_with("wst_"));
    assert_ne!(first["ws_ticket"], second["ws_ticket"]);
}

#[tokio::test]
async fn health_is_public() {
    let (server, _state) = common::test_server();
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    resp.assert_json(&serde_json::json!({ "status": "ok" }));
}

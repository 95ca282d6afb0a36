//! Auth routes: password login, logout and WebSocket tickets.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::auth::password::verify_password;
use crate::auth::tokens;
use crate::error::{ApiError, ApiErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/ws-ticket", post(ws_ticket))
}

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    /// Single-use ticket for ADMIN_JOIN on the gateway.
    pub ws_ticket: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub is_super_admin: bool,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ApiErrorBody),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let username = body.username.trim();
    let user = state
        .store
        .user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    verify_password(&body.password, &user.password_hash).inspect_err(|_| {
        tracing::info!(user_id = user.id, "login rejected");
    })?;

    let kv = state.kv.as_ref();
    let access_token = tokens::generate_session_token();
    tokens::store_session(
        kv,
        &access_token,
        &tokens::SessionData {
            user_id: user.id,
            username: user.username.clone(),
            is_super_admin: user.is_super_admin,
        },
        state.config.session_ttl_secs,
    )
    .await?;
    let ws_ticket = tokens::issue_ws_ticket(kv, user.id).await?;

    tracing::info!(user_id = user.id, is_super_admin = user.is_super_admin, "user logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.session_ttl_secs,
        ws_ticket,
        user: UserInfo {
            id: user.id,
            username: user.username,
            is_super_admin: user.is_super_admin,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /api/auth/logout
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Not authenticated", body = ApiErrorBody),
    ),
)]
pub async fn logout(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    tokens::revoke_session(state.kv.as_ref(), &user.token).await?;
    tracing::info!(user_id = user.user_id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /api/auth/ws-ticket
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct WsTicketResponse {
    pub ws_ticket: String,
}

/// Fresh ticket for reconnecting a dashboard to the gateway.
#[utoipa::path(
    post,
    path = "/api/auth/ws-ticket",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Ticket issued", body = WsTicketResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorBody),
    ),
)]
pub async fn ws_ticket(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<WsTicketResponse>, ApiError> {
    let ws_ticket = tokens::issue_ws_ticket(state.kv.as_ref(), user.user_id).await?;
    Ok(Json(WsTicketResponse { ws_ticket }))
}

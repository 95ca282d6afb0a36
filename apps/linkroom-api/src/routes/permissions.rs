use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::room::RoomSnapshot;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/permissions", post(grant_permission).delete(revoke_permission))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionRequest {
    pub user_id: i64,
    pub room_id: i64,
}

#[utoipa::path(
    post,
    path = "/api/permissions",
    tag = "Permissions",
    security(("bearer" = [])),
    request_body = PermissionRequest,
    responses(
        (status = 201, description = "Grant exists", body = RoomSnapshot),
        (status = 403, description = "Caller is not a super-admin", body = ApiErrorBody),
        (status = 404, description = "Room or user not found", body = ApiErrorBody),
    ),
)]
pub async fn grant_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PermissionRequest>,
) -> Result<(StatusCode, Json<RoomSnapshot>), ApiError> {
    let snapshot = state
        .rooms
        .grant_permission(body.room_id, body.user_id, &user.principal())
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Revoking a grant that doesn't exist still succeeds.
#[utoipa::path(
    delete,
    path = "/api/permissions",
    tag = "Permissions",
    security(("bearer" = [])),
    request_body = PermissionRequest,
    responses(
        (status = 204, description = "Grant removed"),
        (status = 403, description = "Caller is not a super-admin", body = ApiErrorBody),
    ),
)]
pub async fn revoke_permission(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PermissionRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .rooms
        .revoke_permission(body.room_id, body.user_id, &user.principal())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Link endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::link::{Link, LinkWithRoom};
use crate::rooms::LinkUpdate;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link))
        .route("/links/{id}", put(update_link).delete(delete_link))
}

// ---------------------------------------------------------------------------
// POST /api/links
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLinkRequest {
    pub room_id: i64,
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/api/links",
    tag = "Links",
    security(("bearer" = [])),
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link created as available", body = Link),
        (status = 400, description = "Empty URL", body = ApiErrorBody),
        (status = 403, description = "No access to this room", body = ApiErrorBody),
    ),
)]
pub async fn create_link(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<Link>), ApiError> {
    let created = state
        .rooms
        .create_link(body.room_id, &body.url, &user.principal())
        .await?;
    Ok((StatusCode::CREATED, Json(created.link)))
}

// ---------------------------------------------------------------------------
// PUT /api/links/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLinkRequest {
    pub url: Option<String>,
    /// One of `available`, `filling`, `full`.
    pub status: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/links/{id}",
    tag = "Links",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Link id")),
    request_body = UpdateLinkRequest,
    responses(
        (status = 200, description = "Updated link with its room name", body = LinkWithRoom),
        (status = 400, description = "Unknown status or empty URL", body = ApiErrorBody),
        (status = 403, description = "No access to this room, or link missing", body = ApiErrorBody),
        (status = 404, description = "Link not found (super-admins only)", body = ApiErrorBody),
    ),
)]
pub async fn update_link(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateLinkRequest>,
) -> Result<Json<LinkWithRoom>, ApiError> {
    let updated = state
        .rooms
        .update_link(
            id,
            LinkUpdate {
                url: body.url,
                status: body.status,
            },
            &user.principal(),
        )
        .await?;
    Ok(Json(updated.link))
}

// ---------------------------------------------------------------------------
// DELETE /api/links/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/links/{id}",
    tag = "Links",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Link id")),
    responses(
        (status = 204, description = "Link deleted"),
        (status = 403, description = "No access to this room, or link missing", body = ApiErrorBody),
        (status = 404, description = "Link not found (super-admins only)", body = ApiErrorBody),
    ),
)]
pub async fn delete_link(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.rooms.delete_link(id, &user.principal()).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Room endpoints and the public link listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::link::Link;
use crate::models::room::RoomSnapshot;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        // One parameter name per segment: a room id here, a room name below.
        .route("/rooms/{room}", delete(delete_room))
        .route("/rooms/{room}/links", get(public_links))
}

// ---------------------------------------------------------------------------
// POST /api/rooms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Trimmed and lower-cased before use.
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "Rooms",
    security(("bearer" = [])),
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomSnapshot),
        (status = 400, description = "Invalid name", body = ApiErrorBody),
        (status = 409, description = "Name already taken", body = ApiErrorBody),
    ),
)]
pub async fn create_room(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomSnapshot>), ApiError> {
    let snapshot = state.rooms.create_room(&body.name, &user.principal()).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

// ---------------------------------------------------------------------------
// DELETE /api/rooms/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    tag = "Rooms",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room, links and grants deleted"),
        (status = 403, description = "No access to this room", body = ApiErrorBody),
        (status = 404, description = "Room not found", body = ApiErrorBody),
    ),
)]
pub async fn delete_room(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.rooms.delete_room(id, &user.principal()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /api/rooms/:room_name/links
// ---------------------------------------------------------------------------

/// Links of a room for anonymous viewers. Unknown rooms yield an empty list.
#[utoipa::path(
    get,
    path = "/api/rooms/{room_name}/links",
    tag = "Rooms",
    params(("room_name" = String, Path, description = "Room name, case-insensitive")),
    responses((status = 200, description = "Links ordered by id", body = [Link])),
)]
pub async fn public_links(
    State(state): State<AppState>,
    Path(room_name): Path<String>,
) -> Result<Json<Vec<Link>>, ApiError> {
    Ok(Json(state.rooms.public_links(&room_name).await?))
}

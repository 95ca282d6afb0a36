use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::rooms::AdminData;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/data", get(admin_data))
}

/// Dashboard bootstrap: the rooms the caller may manage, and for
/// super-admins the users they can grant access to.
#[utoipa::path(
    get,
    path = "/api/admin/data",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dashboard data", body = AdminData),
        (status = 401, description = "Not authenticated", body = ApiErrorBody),
    ),
)]
pub async fn admin_data(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminData>, ApiError> {
    Ok(Json(state.rooms.admin_data(&user.principal()).await?))
}

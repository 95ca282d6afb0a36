pub mod admin;
pub mod auth;
pub mod health;
pub mod links;
pub mod permissions;
pub mod rooms;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api",
            auth::router()
                .merge(admin::router())
                .merge(rooms::router())
                .merge(permissions::router())
                .merge(links::router()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Auth
        auth::login,
        auth::logout,
        auth::ws_ticket,
        // Admin
        admin::admin_data,
        // Rooms
        rooms::create_room,
        rooms::delete_room,
        rooms::public_links,
        // Permissions
        permissions::grant_permission,
        permissions::revoke_permission,
        // Links
        links::create_link,
        links::update_link,
        links::delete_link,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::models::room::Room,
            crate::models::room::RoomSnapshot,
            crate::models::link::Link,
            crate::models::link::LinkStatus,
            crate::models::link::LinkWithRoom,
            crate::models::user::UserSummary,
            crate::rooms::AdminData,
            // Route request/response types
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::WsTicketResponse,
            rooms::CreateRoomRequest,
            permissions::PermissionRequest,
            links::CreateLinkRequest,
            links::UpdateLinkRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Authentication"),
        (name = "Admin", description = "Admin dashboard"),
        (name = "Rooms", description = "Room management and public listing"),
        (name = "Permissions", description = "Room access grants"),
        (name = "Links", description = "Link management"),
    )
)]
pub struct ApiDoc;

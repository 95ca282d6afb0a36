use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::rooms::RoomError;
use crate::store::StoreError;

/// Structured API error returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application-level error type that converts into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: "CONFLICT".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(details: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR".to_string(),
            message: "Validation failed".to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::Validation { field, message } => Self::validation(vec![FieldError {
                field: field.to_string(),
                message,
            }]),
            RoomError::DuplicateName(name) => {
                Self::conflict(format!("A room named '{name}' already exists"))
            }
            RoomError::Forbidden(message) => Self::forbidden(message),
            RoomError::NotFound(resource) => Self::not_found(format!("{resource} not found")),
            RoomError::Store(err) => err.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::conflict(err.to_string()),
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::Internal(err) => {
                tracing::error!(%err, "store error");
                Self::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_errors_map_to_status_and_code() {
        let cases = [
            (
                RoomError::Validation {
                    field: "name",
                    message: "Room name is required".into(),
                },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                RoomError::DuplicateName("team-x".into()),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (RoomError::Forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (RoomError::NotFound("Room"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                RoomError::Store(StoreError::internal(std::io::Error::other("boom"))),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let api: ApiError = StoreError::internal(std::io::Error::other("password=secret")).into();
        assert!(!api.message.contains("secret"));
    }

    #[test]
    fn validation_carries_field_details() {
        let api: ApiError = RoomError::Validation {
            field: "status",
            message: "bad".into(),
        }
        .into();
        let details = api.details.unwrap();
        assert_eq!(details[0].field, "status");
    }
}

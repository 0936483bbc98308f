use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bayu_auth::LoginError;
use bayu_core::{ErrorKind, StoreError};

pub const MISSING_JWT: &str = "Missing or malformed JWT";
pub const INVALID_JWT: &str = "Invalid or expired JWT";
pub const INSUFFICIENT_ROLE: &str = "Insufficient role permissions";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const INVALID_BODY: &str = "Invalid request body";
pub const NOT_FOUND: &str = "Resource not found";
pub const CONFLICT: &str = "Resource already exists";
pub const INTERNAL: &str = "Internal server error";

/// `{"status":"error","message":...}` with the given status code.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// An error on its way out of a handler.
///
/// Store and internal errors never carry their cause to the client; it is
/// logged here.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn internal(cause: impl core::fmt::Display) -> Self {
        tracing::error!(error = %cause, "internal error");
        Self::new(ErrorKind::Internal, INTERNAL)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_error(status_for(self.kind), self.message)
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err.kind() {
            ErrorKind::Unauthenticated => Self::new(ErrorKind::Unauthenticated, INVALID_CREDENTIALS),
            _ => Self::internal(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(detail) => {
                tracing::debug!(%detail, "store lookup found nothing");
                Self::new(ErrorKind::NotFound, NOT_FOUND)
            }
            StoreError::Conflict(detail) => {
                tracing::warn!(%detail, "store rejected a duplicate");
                Self::new(ErrorKind::Conflict, CONFLICT)
            }
            StoreError::Backend(_) => Self::internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_collapse_to_invalid_credentials() {
        let err = ApiError::from(LoginError::InvalidCredentials);
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.message, INVALID_CREDENTIALS);
    }

    #[test]
    fn store_outage_during_login_hides_cause() {
        let err = ApiError::from(LoginError::Store(StoreError::backend("password=hunter2")));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message, INTERNAL);
    }

    #[test]
    fn store_details_stay_on_the_server() {
        let missing = ApiError::from(StoreError::not_found("no row in list_users"));
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(missing.message, NOT_FOUND);

        let duplicate = ApiError::from(StoreError::conflict("users_email_key"));
        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
        assert_eq!(duplicate.message, CONFLICT);

        for err in [missing, duplicate] {
            assert!(!err.message.contains("list_users"));
            assert!(!err.message.contains("users_email_key"));
        }
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(status_for(ErrorKind::MalformedInput), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::dto::{LoginRequest, LoginResponse, LogoutRequest, MeResponse, MessageResponse};
use crate::app::errors::{self, ApiError, json_error};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// POST /login, POST /api/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unparseable login body");
            return json_error(StatusCode::BAD_REQUEST, errors::INVALID_BODY);
        }
    };

    match services
        .authenticator
        .login(&req.email, &req.password, Utc::now())
        .await
    {
        Ok(ok) => (StatusCode::OK, Json(LoginResponse::from(ok))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/auth/logout
///
/// Reports success whenever the body names a log id, whether or not the
/// entry could be closed.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Response {
    let Some(id) = payload.ok().and_then(|Json(req)| req.last_login_log_id) else {
        return json_error(StatusCode::BAD_REQUEST, "last_login_log_id is required");
    };

    match services.authenticator.logout(id, Utc::now()).await {
        Ok(outcome) => {
            tracing::info!(user_id = %principal.user_id(), log_id = %id, ?outcome, "user logged out");
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!(user_id = %principal.user_id(), log_id = %id, "logout for unknown session log entry");
        }
        Err(e) => {
            tracing::warn!(user_id = %principal.user_id(), log_id = %id, error = %e, "failed to record logout");
        }
    }

    (StatusCode::OK, Json(MessageResponse::success("Logged out successfully"))).into_response()
}

/// GET /api/auth/me
pub async fn me(Extension(principal): Extension<PrincipalContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: principal.user_id(),
        email: principal.email().to_string(),
        roles: principal.roles().to_vec(),
    })
}

//! Read-only listings for administrators.

use std::sync::Arc;

use axum::{Json, Router, extract::Extension, routing::get};

use bayu_infra::{Directory, RoleRecord, UserRecord};

use crate::app::dto::ListResponse;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/roles", get(list_roles))
}

/// GET /api/users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ListResponse<UserRecord>>, ApiError> {
    let users = services.directory.list_users().await?;
    Ok(Json(ListResponse::new(users)))
}

/// GET /api/roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ListResponse<RoleRecord>>, ApiError> {
    let roles = services.directory.list_roles().await?;
    Ok(Json(ListResponse::new(roles)))
}

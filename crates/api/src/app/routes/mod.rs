use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use bayu_auth::RolePolicy;

use crate::middleware;

pub mod admin;
pub mod auth;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/login", post(auth::login))
        .route("/api/login", post(auth::login))
}

/// Routes behind the authentication stage. Admin routes add the role stage.
pub fn protected_router() -> Router {
    let admin_only = Arc::new(RolePolicy::admin_only());

    let admin = admin::router().route_layer(axum::middleware::from_fn_with_state(
        admin_only,
        middleware::require_role,
    ));

    Router::new()
        .route("/api/dashboard", get(system::dashboard))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .merge(admin)
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store adapters, token service, hasher
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use bayu_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices, config: &AppConfig) -> Router {
    let auth_state = middleware::AuthState {
        tokens: Arc::clone(&services.tokens),
    };

    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.frontend_origin)),
        )
}

fn cors_layer(frontend_origin: &str) -> CorsLayer {
    const ALLOWED_HEADERS: [HeaderName; 4] = [
        header::ORIGIN,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::AUTHORIZATION,
    ];

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers(ALLOWED_HEADERS)
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin = frontend_origin, error = %e, "FRONTEND_ORIGIN is not a valid header value; cross-origin requests disabled");
            layer
        }
    }
}

//! Access control: an authentication stage and a role stage.
//!
//! The role stage reads the [`PrincipalContext`] the authentication stage
//! inserted, so it must be layered inside it.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use bayu_auth::{RolePolicy, TokenService, require_any_role};

use crate::app::errors::{self, json_error};
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenService>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = extract_bearer(req.headers()) else {
        tracing::debug!(path = %req.uri().path(), "missing or malformed authorization header");
        return Err(json_error(StatusCode::BAD_REQUEST, errors::MISSING_JWT));
    };

    let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        json_error(StatusCode::UNAUTHORIZED, errors::INVALID_JWT)
    })?;

    req.extensions_mut().insert(PrincipalContext::from(claims));

    Ok(next.run(req).await)
}

/// Role stage. Use with `from_fn_with_state(Arc<RolePolicy>, require_role)`.
pub async fn require_role(
    State(policy): State<Arc<RolePolicy>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let principal = req.extensions().get::<PrincipalContext>();

    if let Err(e) = require_any_role(principal.map(|p| p.roles()), &policy) {
        tracing::warn!(
            user_id = ?principal.map(|p| p.user_id()),
            path = %req.uri().path(),
            error = %e,
            "role check failed"
        );
        return Err(json_error(StatusCode::FORBIDDEN, errors::INSUFFICIENT_ROLE));
    }

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;

    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

use axum::{Json, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "bayu backend is running",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// GET /api/dashboard
pub async fn dashboard() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the protected dashboard!",
        "data": "This data is from the bayu backend.",
    }))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// Banner for `GET /` when no static site is configured
pub async fn index() -> &'static str {
    "Backend is running. Use /api/price/DUKE%20R9"
}

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "sheet-price",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

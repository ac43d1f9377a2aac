//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response: status, module name, version and database state
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub database: String,
}

/// GET /health
///
/// 200 when the database answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, database) = match state.store.health_check().await {
        Ok(()) => ("ok", StatusCode::OK, "ok".to_string()),
        Err(e) => {
            warn!("Health check failed: {}", e);
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            module: "devwiki-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database,
        }),
    )
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

//! HTTP API handlers

pub mod artifacts;
pub mod data;
pub mod process;

use axum::Json;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health
///
/// Liveness probe for monitoring; no side effects.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "frm-gw".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

//! Artifact serving endpoints
//!
//! Serve the fixed-path image outputs of the most recent pipeline run.
//! There is exactly one of each artifact; whichever run finished last
//! owns them.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Read an artifact off disk and serve it with an explicit content
/// type, or 404 with `missing` when it was never produced.
async fn serve_image(path: &Path, content_type: &'static str, missing: &str) -> ApiResult<Response> {
    if !path.exists() {
        return Err(ApiError::NotFound(missing.to_string()));
    }

    let bytes = tokio::fs::read(path).await?;
    Ok((StatusCode::OK, [("content-type", content_type)], bytes).into_response())
}

/// GET /get-dem
pub async fn get_dem(State(state): State<AppState>) -> ApiResult<Response> {
    serve_image(&state.config.artifacts.dem, "image/png", "DEM not found").await
}

/// GET /get-path
pub async fn get_path(State(state): State<AppState>) -> ApiResult<Response> {
    serve_image(
        &state.config.artifacts.route,
        "image/png",
        "Shortest path not found",
    )
    .await
}

/// GET /get-flood
pub async fn get_flood(State(state): State<AppState>) -> ApiResult<Response> {
    serve_image(
        &state.config.artifacts.flood_mask,
        "image/jpeg",
        "Flood image not found",
    )
    .await
}

/// GET /get-gearth/ query
#[derive(Debug, Deserialize)]
pub struct GearthQuery {
    pub place: String,
}

/// GET /get-gearth/?place=...
///
/// Re-invokes the satellite fetcher (which caches per place) and
/// serves the resulting image.
pub async fn get_gearth(
    State(state): State<AppState>,
    Query(query): Query<GearthQuery>,
) -> ApiResult<Response> {
    let place = query.place.trim();

    let fetched = match state.tools.satellite.fetch(place).await {
        Ok(path) => path,
        Err(e) => {
            warn!(place = %place, error = %e, "Satellite fetch failed");
            None
        }
    };

    match fetched {
        Some(path) => {
            serve_image(
                &path,
                "image/jpeg",
                &format!("Satellite image not found for {place}"),
            )
            .await
        }
        None => Err(ApiError::NotFound(format!(
            "Satellite image not found for {place}"
        ))),
    }
}

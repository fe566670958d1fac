//! Pipeline trigger endpoint

use axum::{extract::State, Form, Json};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{self, PipelineOutput};
use crate::AppState;

/// POST /process/ form body
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub place: String,
}

/// POST /process/
///
/// Runs the full geospatial pipeline for a place and returns the
/// artifact paths for the frontend. The fixed-path artifacts are
/// shared by every run, so a request that arrives while another run
/// is in flight is rejected with 409 instead of corrupting them.
pub async fn process_place(
    State(state): State<AppState>,
    Form(request): Form<ProcessRequest>,
) -> ApiResult<Json<PipelineOutput>> {
    let place = request.place.trim();
    if place.is_empty() {
        return Err(ApiError::BadRequest("place must not be empty".to_string()));
    }

    let _guard = state
        .run_guard
        .try_lock()
        .map_err(|_| ApiError::Conflict("A pipeline run is already in progress".to_string()))?;

    info!(place = %place, "Received place");

    let output = pipeline::run(&state.tools, &state.config.artifacts, place)
        .await
        .map_err(|e| {
            warn!(place = %place, error = ?e, "Pipeline aborted");
            ApiError::from(e)
        })?;

    Ok(Json(output))
}

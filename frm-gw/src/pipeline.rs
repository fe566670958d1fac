//! Sequential pipeline orchestration
//!
//! Drives the six external steps in a fixed order, aborting on the
//! first failure: DEM generation, road extraction, overlay
//! composition, satellite fetch, shortest-path planning, flood
//! segmentation. All artifacts land at the fixed paths in
//! [`ArtifactPaths`] and are overwritten by the next run.

use crate::config::ArtifactPaths;
use crate::tools::{ToolError, Toolset};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pipeline step failures, carrying the user-facing message
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error generating DEM.")]
    Dem(#[source] ToolError),

    #[error("Error extracting roads.")]
    Roads(#[source] ToolError),

    #[error("Error generating elevation overlay.")]
    Overlay(#[source] ToolError),

    /// Satellite fetch came back empty; reported as 404 rather than a
    /// step failure.
    #[error("Satellite image not found for {place}.")]
    Satellite { place: String },

    #[error("Error generating shortest path.")]
    Route(#[source] ToolError),

    #[error("Error extracting flood image.")]
    Flood(#[source] ToolError),
}

/// Artifact paths reported to the frontend after a successful run.
///
/// Field names are the wire format the frontend already consumes.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub dem_path: String,
    pub path_result: String,
    pub gearth_path: String,
    pub waterseg: String,
}

/// Run the full pipeline for `place`.
pub async fn run(
    tools: &Toolset,
    paths: &ArtifactPaths,
    place: &str,
) -> Result<PipelineOutput, PipelineError> {
    info!(place = %place, "Pipeline started");

    tools.dem.generate(place).await.map_err(PipelineError::Dem)?;
    debug!(out = %paths.dem.display(), "DEM generated");

    tools
        .roads
        .extract(&paths.road_mask, place)
        .await
        .map_err(PipelineError::Roads)?;
    debug!(out = %paths.road_mask.display(), "Roads extracted");

    tools
        .overlay
        .compose(&paths.dem, &paths.road_mask, &paths.overlay)
        .await
        .map_err(PipelineError::Overlay)?;
    debug!(out = %paths.overlay.display(), "Overlay composed");

    let gearth_path = match tools.satellite.fetch(place).await {
        Ok(Some(path)) => path,
        Ok(None) => {
            return Err(PipelineError::Satellite {
                place: place.to_string(),
            })
        }
        Err(e) => {
            // The original contract makes no distinction between "no
            // image" and "fetcher broken"; keep the client-facing 404
            // and log the real cause.
            warn!(error = %e, "Satellite fetcher errored");
            return Err(PipelineError::Satellite {
                place: place.to_string(),
            });
        }
    };
    debug!(path = %gearth_path.display(), "Satellite image ready");

    tools
        .planner
        .plan(&paths.overlay, &paths.route)
        .await
        .map_err(PipelineError::Route)?;
    debug!(out = %paths.route.display(), "Shortest path planned");

    tools
        .flood
        .segment(place)
        .await
        .map_err(PipelineError::Flood)?;
    debug!(out = %paths.flood_mask.display(), "Flood mask segmented");

    info!(place = %place, "Pipeline complete");

    Ok(PipelineOutput {
        dem_path: paths.dem.display().to_string(),
        path_result: paths.route.display().to_string(),
        gearth_path: gearth_path.display().to_string(),
        waterseg: paths.flood_mask.display().to_string(),
    })
}

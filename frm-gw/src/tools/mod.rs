//! External tool seams
//!
//! Every computational step of the pipeline is an external program:
//! the gateway never computes elevation, roads, floods, or routes
//! itself. Each step gets a trait here so the pipeline and the HTTP
//! layer only see the contract; the production implementations in
//! [`command`] spawn the configured command lines.

mod command;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Tool invocation errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Program not found in PATH
    #[error("tool `{0}` not found in PATH")]
    NotFound(String),

    /// Failed to spawn the program
    #[error("failed to execute `{program}`: {source}")]
    Execution {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program ran but reported failure
    #[error("`{program}` exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Program reported success but the expected artifact is missing
    #[error("`{program}` did not produce expected artifact {path:?}")]
    MissingArtifact { program: String, path: PathBuf },

    /// Blocking task was cancelled or panicked
    #[error("tool task failed: {0}")]
    Join(String),
}

/// Generates the DEM render for a place, writing it to the configured
/// output path.
#[async_trait]
pub trait DemGenerator: Send + Sync {
    async fn generate(&self, place: &str) -> Result<(), ToolError>;
}

/// Extracts a road mask for a place into `out`.
#[async_trait]
pub trait RoadExtractor: Send + Sync {
    async fn extract(&self, out: &Path, place: &str) -> Result<(), ToolError>;
}

/// Composites the DEM render and road mask into an overlay image.
#[async_trait]
pub trait OverlayCompositor: Send + Sync {
    async fn compose(&self, dem: &Path, road: &Path, out: &Path) -> Result<(), ToolError>;
}

/// Fetches (or re-uses a cached) satellite image for a place.
///
/// Returns the image path, or `None` when no image could be obtained;
/// the HTTP layer reports that as 404 rather than a server error.
#[async_trait]
pub trait SatelliteFetcher: Send + Sync {
    async fn fetch(&self, place: &str) -> Result<Option<PathBuf>, ToolError>;
}

/// Plans the shortest path over the overlay image, writing the route
/// render to `out` and a path-length log as a side file.
#[async_trait]
pub trait PathPlanner: Send + Sync {
    async fn plan(&self, overlay: &Path, out: &Path) -> Result<(), ToolError>;
}

/// Runs flood segmentation for a place, writing the mask to the
/// configured output path.
#[async_trait]
pub trait FloodSegmenter: Send + Sync {
    async fn segment(&self, place: &str) -> Result<(), ToolError>;
}

/// The full set of collaborators the pipeline drives.
///
/// Handlers and tests swap individual seams; production wiring comes
/// from [`Toolset::from_config`].
pub struct Toolset {
    pub dem: Arc<dyn DemGenerator>,
    pub roads: Arc<dyn RoadExtractor>,
    pub overlay: Arc<dyn OverlayCompositor>,
    pub satellite: Arc<dyn SatelliteFetcher>,
    pub planner: Arc<dyn PathPlanner>,
    pub flood: Arc<dyn FloodSegmenter>,
}

//! frm-gw library - Flood Relief Mapper gateway
//!
//! HTTP dispatch layer over the external geospatial pipeline: accept a
//! place name, drive the tools in a fixed sequence, and serve the
//! resulting artifacts and side files to the frontend.

use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tools;

use config::Config;
use tools::Toolset;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tools: Arc<Toolset>,
    /// Guards the fixed-path artifacts: one pipeline run at a time
    pub run_guard: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, tools: Toolset) -> Self {
        Self {
            config: Arc::new(config),
            tools: Arc::new(tools),
            run_guard: Arc::new(Mutex::new(())),
        }
    }
}

/// Build application router
///
/// The browser frontend is served from a different origin, so CORS
/// stays permissive, matching how the frontend has always called this
/// service.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/process/", post(api::process::process_place))
        .route("/get-data", get(api::data::get_data))
        .route("/get-place-data/:place_name", get(api::data::get_place_data))
        .route("/get-dem", get(api::artifacts::get_dem))
        .route("/get-path", get(api::artifacts::get_path))
        .route("/get-flood", get(api::artifacts::get_flood))
        .route("/get-gearth/", get(api::artifacts::get_gearth))
        .route("/health", get(api::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

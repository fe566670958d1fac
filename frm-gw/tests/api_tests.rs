//! Integration tests for the frm-gw HTTP API
//!
//! Drives the router directly with a mocked toolset, covering the
//! pipeline trigger (success, per-step failures, busy rejection), the
//! text data endpoints, artifact serving, and the health probe.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use frm_gw::config::Config;
use frm_gw::tools::{
    DemGenerator, FloodSegmenter, OverlayCompositor, PathPlanner, RoadExtractor,
    SatelliteFetcher, ToolError, Toolset,
};
use frm_gw::{build_router, AppState};

/// Scripted toolset: every seam succeeds unless told otherwise.
#[derive(Clone, Default)]
struct MockTools {
    fail_dem: bool,
    fail_roads: bool,
    fail_flood: bool,
    dem_delay: Option<Duration>,
    satellite: Option<PathBuf>,
}

fn tool_failure() -> ToolError {
    ToolError::Failed {
        program: "mock-tool".to_string(),
        code: Some(1),
        stderr: "mock failure".to_string(),
    }
}

#[async_trait]
impl DemGenerator for MockTools {
    async fn generate(&self, _place: &str) -> Result<(), ToolError> {
        if let Some(delay) = self.dem_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_dem {
            return Err(tool_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl RoadExtractor for MockTools {
    async fn extract(&self, _out: &std::path::Path, _place: &str) -> Result<(), ToolError> {
        if self.fail_roads {
            return Err(tool_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl OverlayCompositor for MockTools {
    async fn compose(
        &self,
        _dem: &std::path::Path,
        _road: &std::path::Path,
        _out: &std::path::Path,
    ) -> Result<(), ToolError> {
        Ok(())
    }
}

#[async_trait]
impl SatelliteFetcher for MockTools {
    async fn fetch(&self, _place: &str) -> Result<Option<PathBuf>, ToolError> {
        Ok(self.satellite.clone())
    }
}

#[async_trait]
impl PathPlanner for MockTools {
    async fn plan(&self, _overlay: &std::path::Path, _out: &std::path::Path) -> Result<(), ToolError> {
        Ok(())
    }
}

#[async_trait]
impl FloodSegmenter for MockTools {
    async fn segment(&self, _place: &str) -> Result<(), ToolError> {
        if self.fail_flood {
            return Err(tool_failure());
        }
        Ok(())
    }
}

fn toolset(mock: MockTools) -> Toolset {
    let mock = Arc::new(mock);
    Toolset {
        dem: mock.clone(),
        roads: mock.clone(),
        overlay: mock.clone(),
        satellite: mock.clone(),
        planner: mock.clone(),
        flood: mock,
    }
}

/// Test helper: app over a temp root folder with the given mocks.
/// The TempDir must stay alive for the duration of the test.
fn setup(mock: MockTools) -> (TempDir, Config, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_root(dir.path().to_path_buf());
    config.ensure_directories().unwrap();

    let state = AppState::new(config.clone(), toolset(mock));
    let app = build_router(state);
    (dir, config, app)
}

/// A mock toolset where every step succeeds and the satellite image
/// exists on disk.
fn all_success(config: &Config) -> MockTools {
    let image = config.artifacts.satellite_cache.join("chennai.jpg");
    std::fs::write(&image, b"jpeg bytes").unwrap();
    MockTools {
        satellite: Some(image),
        ..MockTools::default()
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_module_and_version() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "frm-gw");
    assert!(body["version"].is_string());
}

// =============================================================================
// POST /process/
// =============================================================================

#[tokio::test]
async fn process_success_returns_artifact_paths() {
    let (_dir, config, app) = {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path().to_path_buf());
        config.ensure_directories().unwrap();
        let mock = all_success(&config);
        let state = AppState::new(config.clone(), toolset(mock));
        (dir, config.clone(), build_router(state))
    };

    let response = app
        .oneshot(post_form("/process/", "place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["dem_path"], config.artifacts.dem.display().to_string());
    assert_eq!(
        body["path_result"],
        config.artifacts.route.display().to_string()
    );
    assert_eq!(
        body["waterseg"],
        config.artifacts.flood_mask.display().to_string()
    );
    assert!(body["gearth_path"]
        .as_str()
        .unwrap()
        .ends_with("chennai.jpg"));
}

#[tokio::test]
async fn process_dem_failure_returns_400() {
    let (_dir, _config, app) = setup(MockTools {
        fail_dem: true,
        ..MockTools::default()
    });

    let response = app
        .oneshot(post_form("/process/", "place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Error generating DEM.");
}

#[tokio::test]
async fn process_road_failure_returns_400() {
    let (_dir, _config, app) = setup(MockTools {
        fail_roads: true,
        ..MockTools::default()
    });

    let response = app
        .oneshot(post_form("/process/", "place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["message"], "Error extracting roads.");
}

#[tokio::test]
async fn process_flood_failure_happens_after_the_other_steps() {
    let (_dir, _config, app) = {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path().to_path_buf());
        config.ensure_directories().unwrap();
        let mock = MockTools {
            fail_flood: true,
            ..all_success(&config)
        };
        let state = AppState::new(config.clone(), toolset(mock));
        (dir, config, build_router(state))
    };

    let response = app
        .oneshot(post_form("/process/", "place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["message"], "Error extracting flood image.");
}

#[tokio::test]
async fn process_satellite_miss_returns_404() {
    // Default mock: satellite fetch yields nothing
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app
        .oneshot(post_form("/process/", "place=Nowhere"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(
        body["error"]["message"],
        "Satellite image not found for Nowhere."
    );
}

#[tokio::test]
async fn process_empty_place_returns_400() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app
        .oneshot(post_form("/process/", "place=%20%20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_rejects_concurrent_runs() {
    let (_dir, _config, app) = {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path().to_path_buf());
        config.ensure_directories().unwrap();
        let mock = MockTools {
            dem_delay: Some(Duration::from_millis(200)),
            ..all_success(&config)
        };
        let state = AppState::new(config.clone(), toolset(mock));
        (dir, config, build_router(state))
    };

    let (first, second) = tokio::join!(
        app.clone().oneshot(post_form("/process/", "place=Chennai")),
        app.clone().oneshot(post_form("/process/", "place=Kochi")),
    );

    let mut statuses = [first.unwrap().status(), second.unwrap().status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    // Once the first run finishes, the guard is free again
    let response = app
        .oneshot(post_form("/process/", "place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// GET /get-data
// =============================================================================

#[tokio::test]
async fn get_data_parses_path_length_log() {
    let (_dir, config, app) = setup(MockTools::default());
    std::fs::write(
        &config.artifacts.path_lengths,
        "1, 12.5, 3.2\n2, 8.0, 1.9\nnot a row\n",
    )
    .unwrap();

    let response = app.oneshot(get("/get-data")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["pathNumber"], 1);
    assert_eq!(data[0]["pathLength"], 12.5);
    assert_eq!(data[1]["time"], 1.9);
}

#[tokio::test]
async fn get_data_without_log_returns_empty_list() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app.oneshot(get("/get-data")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

// =============================================================================
// GET /get-place-data/{place_name}
// =============================================================================

#[tokio::test]
async fn get_place_data_matches_case_insensitively() {
    let (_dir, config, app) = setup(MockTools::default());
    std::fs::write(
        &config.artifacts.place_data,
        "Chennai, 26903, 426, 6.7, 120\nKochi, 7100, 94, 3.0, 45\n",
    )
    .unwrap();

    let response = app.oneshot(get("/get-place-data/chennai")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["placeName"], "Chennai");
    assert_eq!(body["populationDensity"], "26903");
    assert_eq!(body["area"], "426");
    assert_eq!(body["elevation"], "6.7");
    assert_eq!(body["boatsNeeded"], "120");
}

#[tokio::test]
async fn get_place_data_unknown_place_returns_empty_object() {
    let (_dir, config, app) = setup(MockTools::default());
    std::fs::write(&config.artifacts.place_data, "Kochi, 7100, 94, 3.0, 45\n").unwrap();

    let response = app.oneshot(get("/get-place-data/Atlantis")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body.as_object().unwrap().is_empty());
}

#[tokio::test]
async fn get_place_data_without_file_returns_empty_object() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app.oneshot(get("/get-place-data/Chennai")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body.as_object().unwrap().is_empty());
}

// =============================================================================
// Artifact serving
// =============================================================================

#[tokio::test]
async fn get_dem_serves_png_bytes() {
    let (_dir, config, app) = setup(MockTools::default());
    std::fs::write(&config.artifacts.dem, b"png bytes").unwrap();

    let response = app.oneshot(get("/get-dem")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"png bytes");
}

#[tokio::test]
async fn get_dem_missing_returns_404() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app.oneshot(get("/get-dem")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "DEM not found");
}

#[tokio::test]
async fn get_path_missing_returns_404() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app.oneshot(get("/get-path")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_flood_serves_jpeg() {
    let (_dir, config, app) = setup(MockTools::default());
    std::fs::write(&config.artifacts.flood_mask, b"jpeg bytes").unwrap();

    let response = app.oneshot(get("/get-flood")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
}

// =============================================================================
// GET /get-gearth/
// =============================================================================

#[tokio::test]
async fn get_gearth_serves_fetched_image() {
    let (_dir, _config, app) = {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_root(dir.path().to_path_buf());
        config.ensure_directories().unwrap();
        let mock = all_success(&config);
        let state = AppState::new(config.clone(), toolset(mock));
        (dir, config, build_router(state))
    };

    let response = app
        .oneshot(get("/get-gearth/?place=Chennai"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"jpeg bytes");
}

#[tokio::test]
async fn get_gearth_miss_returns_404() {
    let (_dir, _config, app) = setup(MockTools::default());

    let response = app
        .oneshot(get("/get-gearth/?place=Nowhere"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(
        body["error"]["message"],
        "Satellite image not found for Nowhere"
    );
}

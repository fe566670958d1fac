//! Text data endpoints
//!
//! Expose the planner's path-length log and the place-metadata file in
//! the JSON shapes the frontend charts from.

use axum::extract::{Path, State};
use axum::Json;
use frm_common::records;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /get-data
///
/// Path-length records from the latest planner run; an absent log
/// yields an empty list, not an error.
pub async fn get_data(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let path = &state.config.artifacts.path_lengths;

    let records = if path.exists() {
        let contents = tokio::fs::read_to_string(path).await?;
        records::parse_path_records(&contents)
    } else {
        Vec::new()
    };

    Ok(Json(json!({ "data": records })))
}

/// GET /get-place-data/{place_name}
///
/// Case-insensitive lookup; unknown places yield an empty object so
/// the frontend can probe without error handling.
pub async fn get_place_data(
    State(state): State<AppState>,
    Path(place_name): Path<String>,
) -> ApiResult<Json<Value>> {
    let path = &state.config.artifacts.place_data;
    if !path.exists() {
        return Ok(Json(json!({})));
    }

    let contents = tokio::fs::read_to_string(path).await?;
    match records::find_place(&contents, &place_name) {
        Some(place) => {
            let value = serde_json::to_value(place)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok(Json(value))
        }
        None => Ok(Json(json!({}))),
    }
}

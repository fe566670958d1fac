//! Text record parsing for pipeline side files
//!
//! The path planner appends one row per candidate route to the
//! path-length log, and deployments ship a place-metadata file next to
//! it. Both are plain comma-separated text, parsed here into the
//! camelCase JSON shapes the frontend consumes.

use crate::{Error, Result};
use serde::Serialize;

/// One row of the path-length log: `path_number, length, time`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRecord {
    pub path_number: u32,
    pub path_length: f64,
    pub time: f64,
}

impl PathRecord {
    /// Parse a single log row
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [number, length, time] = fields.as_slice() else {
            return Err(Error::InvalidInput(format!(
                "expected 3 comma-separated fields, got {}",
                fields.len()
            )));
        };

        Ok(Self {
            path_number: number
                .parse()
                .map_err(|_| Error::InvalidInput(format!("bad path number: {number:?}")))?,
            path_length: length
                .parse()
                .map_err(|_| Error::InvalidInput(format!("bad path length: {length:?}")))?,
            time: time
                .parse()
                .map_err(|_| Error::InvalidInput(format!("bad time: {time:?}")))?,
        })
    }
}

/// Parse the full path-length log.
///
/// Blank lines are ignored; malformed rows are skipped with a warning
/// rather than failing the whole read.
pub fn parse_path_records(contents: &str) -> Vec<PathRecord> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match PathRecord::parse(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping malformed path-length row");
                None
            }
        })
        .collect()
}

/// One row of the place-metadata file:
/// `name, population_density, area, elevation, boats_needed`
///
/// Metadata columns are kept as strings; the frontend formats them
/// as-is and the source file carries units inconsistently.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub place_name: String,
    pub population_density: String,
    pub area: String,
    pub elevation: String,
    pub boats_needed: String,
}

/// Look up a place by name, case-insensitively, returning the first
/// matching row.
pub fn find_place(contents: &str, name: &str) -> Option<PlaceRecord> {
    let wanted = name.trim().to_lowercase();

    contents
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [place, density, area, elevation, boats] = fields.as_slice() else {
                return None;
            };
            Some(PlaceRecord {
                place_name: place.to_string(),
                population_density: density.to_string(),
                area: area.to_string(),
                elevation: elevation.to_string(),
                boats_needed: boats.to_string(),
            })
        })
        .find(|record| record.place_name.to_lowercase() == wanted)
}

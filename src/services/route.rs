// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Path export for map clients: encoded polyline and GeoJSON.

use crate::models::GeoPoint;
use crate::services::metrics;
use geo::LineString;
use geojson::{Feature, Geometry};

/// Polyline precision used by the map SDKs (5 decimal places).
pub const POLYLINE_PRECISION: u32 = 5;

/// Convert a sampled path into a geo line string (x = lon, y = lat).
pub fn to_line_string(path: &[GeoPoint]) -> LineString<f64> {
    path.iter().map(|point| point.to_coord()).collect()
}

/// Encode a path as a Google polyline.
pub fn encode_path(path: &[GeoPoint]) -> Result<String, RouteError> {
    polyline::encode_coordinates(path.iter().map(|point| point.to_coord()), POLYLINE_PRECISION)
        .map_err(|e| RouteError::Encode(e.to_string()))
}

/// Path as a GeoJSON `LineString` feature with distance properties.
pub fn path_feature(path: &[GeoPoint], distance_meters: f64) -> Feature {
    let line = to_line_string(path);
    let mut feature = Feature::from(Geometry::new(geojson::Value::from(&line)));
    feature.set_property("distance_meters", distance_meters);
    feature.set_property(
        "distance_miles",
        metrics::meters_to_miles(distance_meters),
    );
    feature.set_property("points", path.len());
    feature
}

/// Errors from path export.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Failed to encode polyline: {0}")]
    Encode(String),
}

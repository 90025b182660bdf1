// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance, pace and stopwatch arithmetic.
//!
//! Everything here is pure: no clock reads, no I/O.

use crate::models::GeoPoint;
use crate::services::session::SessionError;
use geo::{Distance, Geodesic};
use std::cmp::Ordering;

/// Meters to statute miles. Historical journal entries were computed with
/// exactly this factor, so it must not be replaced by a more precise one.
pub const METERS_TO_MILES: f64 = 0.000621371;

/// Shown in place of a pace that cannot be computed.
pub const PACE_PLACEHOLDER: &str = "--:--";

/// Geodesic distance in meters on the WGS-84 ellipsoid.
///
/// The two points are put in a canonical order first so the result is
/// bit-for-bit identical regardless of argument order.
pub fn distance_between(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }

    let (first, second) = match compare_points(&a, &b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };

    Geodesic.distance(first.to_geo(), second.to_geo())
}

fn compare_points(a: &GeoPoint, b: &GeoPoint) -> Ordering {
    a.latitude
        .total_cmp(&b.latitude)
        .then(a.longitude.total_cmp(&b.longitude))
}

/// Sum of consecutive distances along a path.
pub fn path_distance(path: &[GeoPoint]) -> f64 {
    path.windows(2)
        .map(|pair| distance_between(pair[0], pair[1]))
        .sum()
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters * METERS_TO_MILES
}

/// Format elapsed milliseconds as "HH:MM:SS".
///
/// Sub-second remainders are truncated. Hours widen past two digits
/// instead of wrapping.
pub fn format_duration(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let mins = (total_secs / 60) % 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// Average pace in minutes per mile.
///
/// Elapsed time counts whole seconds only. A run with no distance has no
/// pace and yields `UndefinedPace` rather than an infinite value.
pub fn average_pace(distance_meters: f64, elapsed_ms: i64) -> Result<f64, SessionError> {
    if !distance_meters.is_finite() || distance_meters <= 0.0 {
        return Err(SessionError::UndefinedPace);
    }

    let whole_secs = elapsed_ms.max(0) / 1000;
    let minutes = whole_secs as f64 / 60.0;
    Ok(minutes / meters_to_miles(distance_meters))
}

/// Format decimal minutes as "M:SS" (9.87 -> "9:52").
///
/// Seconds round to nearest; a rounded 60 carries into the minutes.
pub fn format_pace(decimal_minutes: f64) -> String {
    if !decimal_minutes.is_finite() || decimal_minutes < 0.0 {
        return PACE_PLACEHOLDER.to_string();
    }

    let mut mins = decimal_minutes.floor() as i64;
    let mut secs = ((decimal_minutes - mins as f64) * 60.0).round() as i64;
    if secs >= 60 {
        mins += 1;
        secs -= 60;
    }
    format!("{}:{:02}", mins, secs)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run records, journal entries and live display models.

use crate::services::metrics::{self, PACE_PLACEHOLDER};
use crate::services::session::SessionError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Lifecycle state of a run session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub enum SessionState {
    Idle,
    Running,
    Finished,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Finalized result of a run, handed to the run store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct RunRecord {
    /// Total distance in miles
    pub distance_miles: f32,
    /// Stopwatch time, "HH:MM:SS"
    pub duration: String,
    /// Minutes per mile; `None` when the run covered no distance
    pub average_pace_min_per_mile: Option<f32>,
    /// Local date the run finished, "M/D/YYYY"
    pub date: String,
}

impl RunRecord {
    /// Average pace, or `UndefinedPace` for a run that never moved.
    pub fn average_pace(&self) -> Result<f32, SessionError> {
        self.average_pace_min_per_mile
            .ok_or(SessionError::UndefinedPace)
    }

    /// Pace as "M:SS", or a placeholder when undefined.
    pub fn pace_display(&self) -> String {
        match self.average_pace_min_per_mile {
            Some(pace) => metrics::format_pace(f64::from(pace)),
            None => PACE_PLACEHOLDER.to_string(),
        }
    }
}

/// A run as kept in the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct StoredRun {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub record: RunRecord,
    /// When the journal accepted the run (RFC 3339, UTC)
    pub saved_at: String,
}

/// The three strings shown on the tracking screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct LiveStats {
    pub distance: String,
    pub time: String,
    pub pace: String,
}

impl LiveStats {
    pub fn distance_label(distance_meters: f64) -> String {
        format!(
            "Distance - {:.2} mi",
            metrics::meters_to_miles(distance_meters)
        )
    }

    pub fn time_label(elapsed_ms: i64) -> String {
        format!("Time - {}", metrics::format_duration(elapsed_ms))
    }

    pub fn pace_label(pace_min_per_mile: Option<f64>) -> String {
        let pace = match pace_min_per_mile {
            Some(pace) => metrics::format_pace(pace),
            None => PACE_PLACEHOLDER.to_string(),
        };
        format!("Average Pace - {} min/mi", pace)
    }
}

impl Default for LiveStats {
    fn default() -> Self {
        Self {
            distance: Self::distance_label(0.0),
            time: Self::time_label(0),
            pace: Self::pace_label(None),
        }
    }
}

/// Snapshot of the tracker for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct RunStatus {
    pub state: SessionState,
    pub live: LiveStats,
    pub distance_meters: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub elapsed_ms: i64,
    pub points: usize,
    /// Path encoded as a Google polyline (precision 5)
    pub polyline: String,
    /// Finished runs the store has not accepted yet, oldest first
    pub unsaved: Vec<RunRecord>,
}

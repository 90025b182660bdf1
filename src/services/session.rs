// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run session state machine.
//!
//! A session moves `Idle -> Running -> Finished` exactly once. It owns the
//! sampled path and the accumulated distance; the stopwatch is derived from
//! the injected clock. A new activity needs a new session.

use crate::models::{GeoPoint, LiveStats, RunRecord, SessionState};
use crate::services::metrics;
use crate::time_utils::{format_run_date, Clock};
use std::sync::Arc;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {operation} a session that is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Average pace is undefined for a run with no distance")]
    UndefinedPace,

    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidPoint { latitude: f64, longitude: f64 },
}

/// A single tracked activity.
pub struct RunSession {
    clock: Arc<dyn Clock>,
    state: SessionState,
    path: Vec<GeoPoint>,
    accumulated_distance_meters: f64,
    start_ms: i64,
    end_ms: i64,
    last_point: Option<GeoPoint>,
}

impl RunSession {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: SessionState::Idle,
            path: Vec::new(),
            accumulated_distance_meters: 0.0,
            start_ms: 0,
            end_ms: 0,
            last_point: None,
        }
    }

    /// Start the stopwatch, optionally seeding the path.
    pub fn start(&mut self, initial: Option<GeoPoint>) -> Result<(), SessionError> {
        self.expect_state(SessionState::Idle, "start")?;
        if let Some(point) = initial {
            check_point(&point)?;
        }

        self.start_ms = self.clock.now_ms();
        self.accumulated_distance_meters = 0.0;
        self.path.clear();
        self.path.extend(initial);
        self.last_point = initial;
        self.state = SessionState::Running;

        tracing::info!(
            seeded = initial.is_some(),
            start_ms = self.start_ms,
            "Run session started"
        );
        Ok(())
    }

    /// Append a sample and accumulate the distance from the previous one.
    ///
    /// Returns the distance added in meters (0 for the first point).
    pub fn record_sample(&mut self, point: GeoPoint) -> Result<f64, SessionError> {
        self.expect_state(SessionState::Running, "record a sample for")?;
        check_point(&point)?;

        let delta = self
            .last_point
            .map(|last| metrics::distance_between(last, point))
            .unwrap_or(0.0);

        self.path.push(point);
        self.accumulated_distance_meters += delta;
        self.last_point = Some(point);

        tracing::debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            delta_meters = delta,
            total_meters = self.accumulated_distance_meters,
            "Sample recorded"
        );
        Ok(delta)
    }

    /// Stopwatch reading in milliseconds.
    pub fn elapsed(&self) -> Result<i64, SessionError> {
        let end = match self.state {
            SessionState::Running => self.clock.now_ms(),
            SessionState::Finished => self.end_ms,
            SessionState::Idle => {
                return Err(SessionError::InvalidTransition {
                    operation: "read the stopwatch of",
                    state: self.state,
                })
            }
        };
        Ok((end - self.start_ms).max(0))
    }

    /// Stop the stopwatch and produce the run record.
    pub fn finish(&mut self) -> Result<RunRecord, SessionError> {
        self.expect_state(SessionState::Running, "finish")?;

        self.end_ms = self.clock.now_ms().max(self.start_ms);
        self.state = SessionState::Finished;

        let elapsed_ms = self.end_ms - self.start_ms;
        let record = RunRecord {
            distance_miles: metrics::meters_to_miles(self.accumulated_distance_meters) as f32,
            duration: metrics::format_duration(elapsed_ms),
            average_pace_min_per_mile: metrics::average_pace(
                self.accumulated_distance_meters,
                elapsed_ms,
            )
            .ok()
            .map(|pace| pace as f32),
            date: format_run_date(self.clock.today()),
        };

        tracing::info!(
            distance_meters = self.accumulated_distance_meters,
            duration = %record.duration,
            points = self.path.len(),
            "Run session finished"
        );
        Ok(record)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    pub fn distance_meters(&self) -> f64 {
        self.accumulated_distance_meters
    }

    pub fn last_point(&self) -> Option<GeoPoint> {
        self.last_point
    }

    /// Average pace so far in minutes per mile.
    pub fn average_pace(&self) -> Result<f64, SessionError> {
        metrics::average_pace(self.accumulated_distance_meters, self.elapsed()?)
    }

    pub fn distance_label(&self) -> String {
        LiveStats::distance_label(self.accumulated_distance_meters)
    }

    pub fn time_label(&self) -> String {
        LiveStats::time_label(self.elapsed().unwrap_or(0))
    }

    pub fn pace_label(&self) -> String {
        LiveStats::pace_label(self.average_pace().ok())
    }

    pub fn live_stats(&self) -> LiveStats {
        LiveStats {
            distance: self.distance_label(),
            time: self.time_label(),
            pace: self.pace_label(),
        }
    }

    fn expect_state(
        &self,
        expected: SessionState,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }
}

fn check_point(point: &GeoPoint) -> Result<(), SessionError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(SessionError::InvalidPoint {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

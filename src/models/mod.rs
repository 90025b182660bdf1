// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod geo_point;
pub mod run;

pub use geo_point::GeoPoint;
pub use run::{LiveStats, RunRecord, RunStatus, SessionState, StoredRun};

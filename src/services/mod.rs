// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod location;
pub mod metrics;
pub mod route;
pub mod session;
pub mod tracker;

pub use location::{DeviceLocation, LocationError, LocationSource};
pub use session::{RunSession, SessionError};
pub use tracker::{RunTracker, TrackerError, TrackerSettings};

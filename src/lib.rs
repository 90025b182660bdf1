// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-Tracker: stopwatch, path, distance and pace for a tracked run
//!
//! This crate provides the tracking core of a fitness screen: a run session
//! state machine driven by periodic timers, a device-fed location source and
//! a local journal of finished runs, exposed over a small HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::JournalStore;
use services::{DeviceLocation, RunTracker};

/// Tracker as wired in the application.
pub type AppTracker = RunTracker<DeviceLocation, JournalStore>;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub location: DeviceLocation,
    pub journal: JournalStore,
    pub tracker: AppTracker,
}

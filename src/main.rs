// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run-Tracker API Server
//!
//! Tracks a run from location fixes posted by the device and keeps a
//! journal of finished runs.

use anyhow::Context;
use run_tracker::{
    config::Config,
    db::JournalStore,
    services::{DeviceLocation, RunTracker, TrackerSettings},
    time_utils::MonotonicClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Run-Tracker API");

    // Open the run journal
    let journal = match &config.journal_path {
        Some(path) => JournalStore::open(path)
            .await
            .with_context(|| format!("Failed to open journal at {}", path.display()))?,
        None => {
            tracing::warn!("JOURNAL_PATH not set; finished runs are kept in memory only");
            JournalStore::in_memory()
        }
    };

    let location = DeviceLocation::new(config.location_permission);
    let settings = TrackerSettings::from(&config);
    tracing::info!(
        stopwatch_ms = settings.stopwatch_interval.as_millis() as u64,
        sample_ms = settings.sample_interval.as_millis() as u64,
        location_timeout_ms = settings.location_timeout.as_millis() as u64,
        "Tracker configured"
    );

    let tracker = RunTracker::new(
        location.clone(),
        journal.clone(),
        Arc::new(MonotonicClock::new()),
        settings,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        location,
        journal,
        tracker,
    });

    // Build router
    let app = run_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("run_tracker=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}

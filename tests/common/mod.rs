// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use run_tracker::config::Config;
use run_tracker::db::JournalStore;
use run_tracker::routes::create_router;
use run_tracker::services::{DeviceLocation, RunTracker, TrackerSettings};
use run_tracker::time_utils::MonotonicClock;
use run_tracker::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app with an in-memory journal and permission granted.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let location = DeviceLocation::new(config.location_permission);
    let journal = JournalStore::in_memory();
    let tracker = RunTracker::new(
        location.clone(),
        journal.clone(),
        Arc::new(MonotonicClock::new()),
        TrackerSettings::from(&config),
    );

    let state = Arc::new(AppState {
        config,
        location,
        journal,
        tracker,
    });

    (create_router(state.clone()), state)
}

/// Send a request and decode the response: JSON, Null for empty bodies,
/// a string for plain-text extractor rejections.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

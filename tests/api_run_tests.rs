// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests for tracking and journaling runs.

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_test_app, send};

#[tokio::test]
async fn test_health() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_idle_status() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "GET", "/api/run", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["live"]["distance"], "Distance - 0.00 mi");
    assert_eq!(body["live"]["time"], "Time - 00:00:00");
    assert_eq!(body["live"]["pace"], "Average Pace - --:-- min/mi");
    assert_eq!(body["points"], 0);
}

#[tokio::test]
async fn test_finish_without_run_conflicts() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "POST", "/api/run/finish", None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
async fn test_retry_without_pending_run_not_found() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "POST", "/api/run/save", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_out_of_range_fix_rejected() {
    let (app, state) = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/location",
        Some(json!({ "latitude": 91.0, "longitude": 0.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(state.location.last_known().is_none());
}

#[tokio::test]
async fn test_fix_without_permission_forbidden() {
    let (app, _) = create_test_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/api/location/permission",
        Some(json!({ "granted": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["granted"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/location",
        Some(json!({ "latitude": 1.0, "longitude": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    let (_, body) = send(&app, "GET", "/api/location/permission", None).await;
    assert_eq!(body["granted"], false);
}

#[tokio::test(start_paused = true)]
async fn test_track_and_save_run() {
    let (app, _) = create_test_app();

    let fix = |lat: f64, lon: f64| Some(json!({ "latitude": lat, "longitude": lon }));

    let (status, _) = send(&app, "POST", "/api/location", fix(0.0, 0.0)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "POST", "/api/run/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "running");
    assert_eq!(body["points"], 1);

    // Starting twice is a conflict
    let (status, _) = send(&app, "POST", "/api/run/start", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "POST", "/api/location", fix(0.0, 0.001)).await;
    tokio::time::sleep(std::time::Duration::from_millis(4_100)).await;

    let (_, body) = send(&app, "GET", "/api/run", None).await;
    assert_eq!(body["points"], 2);
    assert_eq!(body["live"]["distance"], "Distance - 0.07 mi");
    assert_eq!(body["live"]["time"], "Time - 00:00:04");

    let (status, route) = send(&app, "GET", "/api/run/route", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(route["type"], "Feature");
    assert_eq!(route["geometry"]["type"], "LineString");
    assert_eq!(route["properties"]["points"], 2);

    let (status, saved) = send(&app, "POST", "/api/run/finish", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["id"], 1);
    assert_eq!(saved["duration"], "00:00:04");
    assert!(saved["average_pace_min_per_mile"].as_f64().is_some());
    let miles = saved["distance_miles"].as_f64().unwrap();
    assert!((miles - 0.0692).abs() < 0.0005);

    let (status, _) = send(&app, "POST", "/api/run/finish", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, runs) = send(&app, "GET", "/api/runs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(runs.as_array().unwrap().len(), 1);

    let (status, run) = send(&app, "GET", "/api/runs/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(run, saved);

    let (status, _) = send(&app, "GET", "/api/runs/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(start_paused = true)]
async fn test_zero_movement_run_saves_without_pace() {
    let (app, _) = create_test_app();

    // No fix yet: the run starts unseeded right away
    let (status, body) = send(&app, "POST", "/api/run/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 0);

    tokio::time::sleep(std::time::Duration::from_millis(3_000)).await;

    let (status, saved) = send(&app, "POST", "/api/run/finish", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["distance_miles"], 0.0);
    assert_eq!(saved["duration"], "00:00:03");
    assert!(saved["average_pace_min_per_mile"].is_null());
}

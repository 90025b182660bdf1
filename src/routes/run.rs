// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Routes for the active run.

use crate::error::Result;
use crate::models::{RunStatus, StoredRun};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Active run routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/run", get(get_status))
        .route("/api/run/start", post(start_run))
        .route("/api/run/finish", post(finish_run))
        .route("/api/run/save", post(retry_save))
        .route("/api/run/route", get(get_route))
}

/// State, live display strings and path of the current run.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<RunStatus> {
    Json(state.tracker.status().await)
}

async fn start_run(State(state): State<Arc<AppState>>) -> Result<Json<RunStatus>> {
    Ok(Json(state.tracker.start().await?))
}

/// Stop the run and save it to the journal.
///
/// If the journal rejects the run, the record is listed in `GET /api/run`
/// under `unsaved`. `POST /api/run/save` saves the oldest one.
async fn finish_run(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<StoredRun>)> {
    let stored = state.tracker.finish().await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn retry_save(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<StoredRun>)> {
    let stored = state.tracker.retry_save().await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Path as a GeoJSON feature for map clients.
async fn get_route(State(state): State<Arc<AppState>>) -> Json<geojson::Feature> {
    Json(state.tracker.route().await)
}

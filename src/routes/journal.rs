// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Journal routes: saved runs.

use crate::error::{AppError, Result};
use crate::models::StoredRun;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs", get(list_runs))
        .route("/api/runs/{id}", get(get_run))
}

async fn list_runs(State(state): State<Arc<AppState>>) -> Json<Vec<StoredRun>> {
    Json(state.journal.list())
}

async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<StoredRun>> {
    state
        .journal
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Run {} not found", id)))
}

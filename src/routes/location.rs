// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location routes: the device pushes fixes and its permission state.

use crate::error::{AppError, Result};
use crate::models::GeoPoint;
use crate::AppState;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Location routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/location", post(push_fix))
        .route(
            "/api/location/permission",
            get(get_permission).put(set_permission),
        )
}

/// A position reported by the device.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct LocationFix {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Location permission state.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct Permission {
    pub granted: bool,
}

/// Accept a new fix from the device.
async fn push_fix(
    State(state): State<Arc<AppState>>,
    Json(fix): Json<LocationFix>,
) -> Result<StatusCode> {
    fix.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .location
        .push_fix(GeoPoint::new(fix.latitude, fix.longitude))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_permission(State(state): State<Arc<AppState>>) -> Json<Permission> {
    Json(Permission {
        granted: state.location.permission_granted(),
    })
}

/// Record the device's answer to the permission prompt.
async fn set_permission(
    State(state): State<Arc<AppState>>,
    Json(permission): Json<Permission>,
) -> Json<Permission> {
    state.location.set_permission(permission.granted);
    Json(permission)
}

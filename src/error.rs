// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::services::location::LocationError;
use crate::services::session::SessionError;
use crate::services::tracker::TrackerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Persist(#[from] StoreError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Session(e) => AppError::Session(e),
            TrackerError::Persist(e) => AppError::Persist(e),
            TrackerError::NothingToSave => AppError::NotFound(err.to_string()),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Session(e @ SessionError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, "invalid_transition", Some(e.to_string()))
            }
            AppError::Session(e @ SessionError::UndefinedPace) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "undefined_pace",
                Some(e.to_string()),
            ),
            AppError::Session(e @ SessionError::InvalidPoint { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_point", Some(e.to_string()))
            }
            AppError::Location(LocationError::PermissionDenied) => {
                (StatusCode::FORBIDDEN, "permission_denied", None)
            }
            AppError::Location(LocationError::Unavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, "location_unavailable", None)
            }
            AppError::Persist(e) => {
                tracing::error!(error = %e, "Run store error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "persist_failure",
                    Some(e.to_string()),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

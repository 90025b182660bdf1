// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run persistence.

pub mod journal;

pub use journal::JournalStore;

use crate::models::{RunRecord, StoredRun};
use std::future::Future;

/// Persists finished runs. A failed save is reported, never retried here.
pub trait RunStore: Send + Sync + 'static {
    fn save(&self, record: &RunRecord) -> impl Future<Output = Result<StoredRun, StoreError>> + Send;
}

/// Errors from the run store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to persist run: {0}")]
    PersistFailure(String),

    #[error("Failed to read journal: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt journal: {0}")]
    Serialization(#[from] serde_json::Error),
}

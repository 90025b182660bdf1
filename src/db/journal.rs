// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run journal: the list of saved runs, optionally backed by a JSON file.
//!
//! The whole journal is rewritten on every save (temp file + rename), so a
//! crash mid-write leaves the previous journal intact. Journals are small:
//! one entry per run.

use crate::db::{RunStore, StoreError};
use crate::models::{RunRecord, StoredRun};
use crate::time_utils::format_utc_rfc3339;
use dashmap::DashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Journal of finished runs.
#[derive(Clone)]
pub struct JournalStore {
    inner: Arc<Journal>,
}

struct Journal {
    runs: DashMap<u64, StoredRun>,
    next_id: AtomicU64,
    path: Option<PathBuf>,
    /// Serializes file rewrites.
    write_lock: tokio::sync::Mutex<()>,
}

impl JournalStore {
    /// Open a file-backed journal. A missing file is an empty journal.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let runs: Vec<StoredRun> = match tokio::fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %path.display(), count = runs.len(), "Opened run journal");
        Ok(Self::from_runs(runs, Some(path)))
    }

    /// Create a journal that lives only in memory.
    pub fn in_memory() -> Self {
        Self::from_runs(Vec::new(), None)
    }

    fn from_runs(runs: Vec<StoredRun>, path: Option<PathBuf>) -> Self {
        let next_id = runs.iter().map(|run| run.id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(Journal {
                runs: runs.into_iter().map(|run| (run.id, run)).collect(),
                next_id: AtomicU64::new(next_id),
                path,
                write_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// All saved runs, oldest first.
    pub fn list(&self) -> Vec<StoredRun> {
        let mut runs: Vec<StoredRun> = self
            .inner
            .runs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        runs.sort_by_key(|run| run.id);
        runs
    }

    pub fn get(&self, id: u64) -> Option<StoredRun> {
        self.inner.runs.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.runs.is_empty()
    }

    async fn append(&self, record: &RunRecord) -> Result<StoredRun, StoreError> {
        let _guard = self.inner.write_lock.lock().await;

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = StoredRun {
            id,
            record: record.clone(),
            saved_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        self.inner.runs.insert(id, stored.clone());

        if let Err(e) = self.flush().await {
            self.inner.runs.remove(&id);
            tracing::error!(id, error = %e, "Failed to write run journal");
            return Err(StoreError::PersistFailure(e.to_string()));
        }

        tracing::info!(id, distance_miles = record.distance_miles, "Run saved");
        Ok(stored)
    }

    /// Rewrite the backing file, if any. Caller holds the write lock.
    async fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(&self.list())?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

impl RunStore for JournalStore {
    fn save(&self, record: &RunRecord) -> impl Future<Output = Result<StoredRun, StoreError>> + Send {
        let store = self.clone();
        let record = record.clone();
        async move { store.append(&record).await }
    }
}

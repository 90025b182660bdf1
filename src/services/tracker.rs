// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run tracker: the single owner of the active run session.
//!
//! The stopwatch starts the moment `start` is called. A fix that is already
//! known seeds the path; otherwise the first fix to arrive within the
//! location timeout seeds it in the background.
//!
//! Two periodic timers drive a running session:
//! 1. Stopwatch: refreshes the time string
//! 2. Sampler: fetches a location, records it, refreshes distance and pace
//!
//! Timers never touch session fields directly. They lock the tracker, check
//! that the session they were spawned for is still running, and call
//! session methods. The timers and the seeding task live in one `JoinSet`
//! that is aborted under the same lock that finishes the session.
//!
//! A run the store rejects waits in an unsaved queue until `retry_save`.

use crate::config::Config;
use crate::db::{RunStore, StoreError};
use crate::models::{GeoPoint, LiveStats, RunRecord, RunStatus, SessionState, StoredRun};
use crate::services::location::{LocationError, LocationSource};
use crate::services::route;
use crate::services::session::{RunSession, SessionError};
use crate::time_utils::Clock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Timer periods and the location timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub stopwatch_interval: Duration,
    pub sample_interval: Duration,
    pub location_timeout: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            stopwatch_interval: Duration::from_secs(1),
            sample_interval: Duration::from_secs(4),
            location_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for TrackerSettings {
    fn from(config: &Config) -> Self {
        Self {
            stopwatch_interval: config.stopwatch_interval,
            sample_interval: config.sample_interval,
            location_timeout: config.location_timeout,
        }
    }
}

/// Errors from tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Persist(#[from] StoreError),

    #[error("No finished run is waiting to be saved")]
    NothingToSave,
}

/// Drives one run session at a time.
pub struct RunTracker<L, S> {
    inner: Arc<Inner<L, S>>,
}

impl<L, S> Clone for RunTracker<L, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct Inner<L, S> {
    location: L,
    store: S,
    clock: Arc<dyn Clock>,
    settings: TrackerSettings,
    active: Mutex<ActiveRun>,
}

#[derive(Default)]
struct ActiveRun {
    session: Option<RunSession>,
    /// Bumped on every start; timers compare it to detect a newer session.
    generation: u64,
    timers: JoinSet<()>,
    display: LiveStats,
    /// Finished records the store rejected, oldest first. A record that is
    /// being saved is not in here.
    unsaved: VecDeque<RunRecord>,
}

impl ActiveRun {
    /// The session a timer was spawned for, if it is still running.
    fn running_session(&mut self, generation: u64) -> Option<&mut RunSession> {
        if self.generation != generation {
            return None;
        }
        self.session
            .as_mut()
            .filter(|session| session.state() == SessionState::Running)
    }

    fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(RunSession::state)
            .unwrap_or(SessionState::Idle)
    }
}

impl<L, S> RunTracker<L, S>
where
    L: LocationSource,
    S: RunStore,
{
    pub fn new(location: L, store: S, clock: Arc<dyn Clock>, settings: TrackerSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                location,
                store,
                clock,
                settings,
                active: Mutex::new(ActiveRun::default()),
            }),
        }
    }

    /// Start a new run and its timers.
    pub async fn start(&self) -> Result<RunStatus, TrackerError> {
        // Only a fix that is ready right now; slower ones are picked up by
        // the seeding task.
        let ready = tokio::time::timeout(Duration::ZERO, self.inner.location.current_location())
            .await
            .ok()
            .and_then(Result::ok)
            .filter(GeoPoint::is_valid);

        let mut active = self.inner.active.lock().await;
        reject_if_running(&active)?;

        let mut session = RunSession::new(self.inner.clock.clone());
        session.start(ready)?;

        active.generation += 1;
        let generation = active.generation;
        // Dropping the previous set aborts anything left from an older run.
        active.timers = JoinSet::new();
        active.display = session.live_stats();
        active.session = Some(session);

        if ready.is_none() {
            let inner = self.inner.clone();
            active
                .timers
                .spawn(async move { inner.seed_path(generation).await });
        }
        let inner = self.inner.clone();
        active
            .timers
            .spawn(async move { inner.run_stopwatch(generation).await });
        let inner = self.inner.clone();
        active
            .timers
            .spawn(async move { inner.run_sampler(generation).await });

        tracing::info!(generation, seeded = ready.is_some(), "Run started");
        Ok(status_of(&active))
    }

    /// Stop the running session and save its record.
    ///
    /// If the store fails, the record joins the unsaved queue.
    pub async fn finish(&self) -> Result<StoredRun, TrackerError> {
        let record = {
            let mut active = self.inner.active.lock().await;
            let state = active.state();
            let Some(session) = active
                .session
                .as_mut()
                .filter(|s| s.state() == SessionState::Running)
            else {
                return Err(SessionError::InvalidTransition {
                    operation: "finish",
                    state,
                }
                .into());
            };

            let record = session.finish()?;
            let display = session.live_stats();
            active.timers.abort_all();
            active.display = display;
            record
        };

        self.inner.save_detached(record, Requeue::Back).await
    }

    /// Save the oldest unsaved record again after a store failure.
    pub async fn retry_save(&self) -> Result<StoredRun, TrackerError> {
        let (record, remaining) = {
            let mut active = self.inner.active.lock().await;
            let record = active
                .unsaved
                .pop_front()
                .ok_or(TrackerError::NothingToSave)?;
            (record, active.unsaved.len())
        };

        tracing::info!(remaining, "Retrying save of finished run");
        self.inner.save_detached(record, Requeue::Front).await
    }

    /// Current state, display strings and path.
    pub async fn status(&self) -> RunStatus {
        let active = self.inner.active.lock().await;
        status_of(&active)
    }

    /// Current path as a GeoJSON feature.
    pub async fn route(&self) -> geojson::Feature {
        let active = self.inner.active.lock().await;
        match &active.session {
            Some(session) => route::path_feature(session.path(), session.distance_meters()),
            None => route::path_feature(&[], 0.0),
        }
    }
}

impl<L, S> Inner<L, S>
where
    L: LocationSource,
    S: RunStore,
{
    /// Location lookup bounded by the configured timeout.
    async fn fetch_location(&self) -> Result<GeoPoint, LocationError> {
        match tokio::time::timeout(
            self.settings.location_timeout,
            self.location.current_location(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.settings.location_timeout.as_millis() as u64,
                    "Location request timed out"
                );
                Err(LocationError::Unavailable)
            }
        }
    }

    /// Seed an unseeded session with the first fix that arrives in time.
    async fn seed_path(&self, generation: u64) {
        let fetched = self.fetch_location().await;

        let mut active = self.active.lock().await;
        let Some(session) = active.running_session(generation) else {
            tracing::debug!(generation, "Discarding initial location for a finished session");
            return;
        };

        match fetched {
            Ok(_) if !session.path().is_empty() => {
                tracing::debug!(generation, "Sampler recorded first; dropping initial location");
            }
            Ok(point) => {
                if let Err(e) = session.record_sample(point) {
                    tracing::warn!(error = %e, "Rejected initial location");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Run continues without an initial location"),
        }
    }

    async fn run_stopwatch(&self, generation: u64) {
        let mut ticker = periodic(self.settings.stopwatch_interval);

        loop {
            ticker.tick().await;
            let mut active = self.active.lock().await;
            let Some(session) = active.running_session(generation) else {
                return;
            };
            let time = session.time_label();
            active.display.time = time;
        }
    }

    async fn run_sampler(&self, generation: u64) {
        let mut ticker = periodic(self.settings.sample_interval);

        loop {
            ticker.tick().await;
            if !self.sample_once(generation).await {
                return;
            }
        }
    }

    /// Fetch a location and apply it to the session of `generation`.
    ///
    /// Returns false once that session is no longer running.
    async fn sample_once(&self, generation: u64) -> bool {
        let fetched = self.fetch_location().await;

        let mut active = self.active.lock().await;
        let Some(session) = active.running_session(generation) else {
            if let Ok(point) = fetched {
                tracing::debug!(
                    generation,
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Discarding location for a session that is no longer running"
                );
            }
            return false;
        };

        match fetched {
            Ok(point) => {
                if let Err(e) = session.record_sample(point) {
                    tracing::warn!(error = %e, "Rejected location sample");
                }
            }
            Err(e) => tracing::warn!(error = %e, "No location sample this period"),
        }

        let distance = session.distance_label();
        let pace = session.pace_label();
        active.display.distance = distance;
        active.display.pace = pace;
        true
    }

    /// Save on a separate task, so a dropped request cannot lose the record.
    async fn save_detached(
        self: &Arc<Self>,
        record: RunRecord,
        requeue: Requeue,
    ) -> Result<StoredRun, TrackerError> {
        let inner = self.clone();
        tokio::spawn(async move { inner.persist(record, requeue).await })
            .await
            .map_err(|e| StoreError::PersistFailure(e.to_string()))?
    }

    async fn persist(&self, record: RunRecord, requeue: Requeue) -> Result<StoredRun, TrackerError> {
        match self.store.save(&record).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                tracing::error!(error = %e, "Run store rejected the finished run");
                let mut active = self.active.lock().await;
                match requeue {
                    Requeue::Front => active.unsaved.push_front(record),
                    Requeue::Back => active.unsaved.push_back(record),
                }
                Err(e.into())
            }
        }
    }
}

/// Where a record that failed to save goes back in the unsaved queue.
#[derive(Debug, Clone, Copy)]
enum Requeue {
    /// A retry keeps its place at the head.
    Front,
    /// A newly finished run queues behind older ones.
    Back,
}

/// Interval whose first tick is one period after start; the start itself
/// already seeded the display and the path.
fn periodic(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn reject_if_running(active: &ActiveRun) -> Result<(), SessionError> {
    match active.state() {
        SessionState::Running => Err(SessionError::InvalidTransition {
            operation: "start",
            state: SessionState::Running,
        }),
        _ => Ok(()),
    }
}

fn status_of(active: &ActiveRun) -> RunStatus {
    let (distance_meters, elapsed_ms, path) = match &active.session {
        Some(session) => (
            session.distance_meters(),
            session.elapsed().unwrap_or(0),
            session.path(),
        ),
        None => (0.0, 0, &[][..]),
    };

    let polyline = route::encode_path(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to encode run path");
        String::new()
    });

    RunStatus {
        state: active.state(),
        live: active.display.clone(),
        distance_meters,
        elapsed_ms,
        points: path.len(),
        polyline,
        unsaved: active.unsaved.iter().cloned().collect(),
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location sources for the tracker.
//!
//! The device (phone) owns the GPS. It pushes fixes and its permission state
//! to us; the tracker asks for the current position on its own schedule.

use crate::models::GeoPoint;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Errors from location lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location unavailable")]
    Unavailable,
}

/// Supplies the device's current position.
pub trait LocationSource: Send + Sync + 'static {
    fn current_location(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send;
}

/// Permission and last fix change together, under the channel's lock.
#[derive(Debug, Clone, Copy)]
struct DeviceState {
    granted: bool,
    fix: Option<GeoPoint>,
}

/// Location source fed by fixes pushed from the device.
#[derive(Clone)]
pub struct DeviceLocation {
    state: Arc<watch::Sender<DeviceState>>,
}

impl DeviceLocation {
    pub fn new(permission_granted: bool) -> Self {
        let (state, _) = watch::channel(DeviceState {
            granted: permission_granted,
            fix: None,
        });
        Self {
            state: Arc::new(state),
        }
    }

    pub fn permission_granted(&self) -> bool {
        self.state.borrow().granted
    }

    /// Record the device's permission answer. Losing permission also drops
    /// the last known fix.
    pub fn set_permission(&self, granted: bool) {
        let mut previous = granted;
        self.state.send_modify(|state| {
            previous = state.granted;
            state.granted = granted;
            if !granted {
                state.fix = None;
            }
        });
        if previous != granted {
            tracing::info!(granted, "Location permission changed");
        }
    }

    /// Accept a new fix from the device.
    pub fn push_fix(&self, point: GeoPoint) -> Result<(), LocationError> {
        let accepted = self.state.send_if_modified(|state| {
            if state.granted {
                state.fix = Some(point);
            }
            state.granted
        });

        if accepted {
            Ok(())
        } else {
            Err(LocationError::PermissionDenied)
        }
    }

    /// Most recent fix without waiting.
    pub fn last_known(&self) -> Option<GeoPoint> {
        self.state.borrow().fix
    }
}

impl LocationSource for DeviceLocation {
    /// Returns the last known fix, waiting for the first one when none has
    /// arrived yet. Losing permission while waiting ends the wait. Callers
    /// bound the wait with their own timeout.
    fn current_location(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send {
        let mut rx = self.state.subscribe();

        async move {
            let state = *rx
                .wait_for(|state| !state.granted || state.fix.is_some())
                .await
                .map_err(|_| LocationError::Unavailable)?;

            if !state.granted {
                return Err(LocationError::PermissionDenied);
            }
            state.fix.ok_or(LocationError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_denied_without_permission() {
        let source = DeviceLocation::new(false);
        assert_eq!(
            source.push_fix(GeoPoint::new(1.0, 2.0)),
            Err(LocationError::PermissionDenied)
        );
        assert_eq!(
            source.current_location().await,
            Err(LocationError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn test_returns_latest_fix() {
        let source = DeviceLocation::new(true);
        source.push_fix(GeoPoint::new(1.0, 2.0)).unwrap();
        source.push_fix(GeoPoint::new(3.0, 4.0)).unwrap();

        assert_eq!(source.current_location().await, Ok(GeoPoint::new(3.0, 4.0)));
        // Reading does not consume the fix
        assert_eq!(source.current_location().await, Ok(GeoPoint::new(3.0, 4.0)));
    }

    #[tokio::test]
    async fn test_waits_for_first_fix() {
        let source = DeviceLocation::new(true);
        let pending = source.current_location();

        let pusher = source.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            pusher.push_fix(GeoPoint::new(5.0, 6.0)).unwrap();
        });

        assert_eq!(pending.await, Ok(GeoPoint::new(5.0, 6.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_fix_never_resolves() {
        let source = DeviceLocation::new(true);
        let result =
            tokio::time::timeout(Duration::from_secs(30), source.current_location()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_revoking_permission_forgets_fix() {
        let source = DeviceLocation::new(true);
        source.push_fix(GeoPoint::new(1.0, 2.0)).unwrap();
        assert!(source.last_known().is_some());

        source.set_permission(false);
        assert!(!source.permission_granted());
        assert!(source.last_known().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoking_permission_ends_wait() {
        let source = DeviceLocation::new(true);
        let waiter = source.clone();
        let pending = tokio::spawn(async move { waiter.current_location().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        source.set_permission(false);

        assert_eq!(pending.await.unwrap(), Err(LocationError::PermissionDenied));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_fix_survives_revocation() {
        for _ in 0..20 {
            let source = DeviceLocation::new(true);

            let pushers: Vec<_> = (0..4)
                .map(|i| {
                    let source = source.clone();
                    tokio::spawn(async move {
                        for j in 0..500 {
                            let _ = source.push_fix(GeoPoint::new(i as f64, j as f64 * 0.01));
                        }
                    })
                })
                .collect();

            tokio::task::yield_now().await;
            source.set_permission(false);

            for pusher in pushers {
                pusher.await.unwrap();
            }
            assert!(source.last_known().is_none());
        }
    }
}

//! Access to the device health store.
//!
//! The store itself is an external capability described by [`HealthStore`].
//! [`WorkoutStoreAccessor`] wraps one and applies the app's policy: every
//! failure degrades to an empty list or a zero sum and is only logged.

use std::future::Future;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use log::{debug, warn};

use crate::error::HealthError;
use crate::health::{HealthDataType, HealthStatistics, QuantityKind, WorkoutSession};
use crate::session::filter::day_range;

/// Read-only view of a device health record store.
pub trait HealthStore {
    fn is_available(&self) -> bool;

    /// Ask for read access to `read`. `Ok(false)` means the user declined.
    fn request_authorization(
        &self,
        read: &[HealthDataType],
    ) -> impl Future<Output = Result<bool, HealthError>> + Send;

    /// Cumulative sum of `kind` over samples starting inside `[start, end]`.
    fn query_statistic(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<f64, HealthError>> + Send;

    /// Sessions starting inside `[start, end]`, most recently ended first.
    fn query_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<WorkoutSession>, HealthError>> + Send;
}

pub struct WorkoutStoreAccessor<S> {
    store: S,
    offset: FixedOffset,
}

impl<S: HealthStore> WorkoutStoreAccessor<S> {
    /// Accessor whose calendar days are UTC days.
    pub fn new(store: S) -> Self {
        Self::with_offset(store, Utc.fix())
    }

    pub fn with_offset(store: S, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub async fn authorize(&self) -> bool {
        if !self.store.is_available() {
            debug!("Health data unavailable, authorization skipped");
            return false;
        }
        match self
            .store
            .request_authorization(&HealthDataType::READ_SCOPES)
            .await
        {
            Ok(granted) => {
                debug!("Health authorization granted={}", granted);
                granted
            }
            Err(e) => {
                warn!("Health authorization failed: {}", e);
                false
            }
        }
    }

    pub async fn try_query_statistic(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, HealthError> {
        if !self.store.is_available() {
            return Err(HealthError::Unavailable);
        }
        self.store.query_statistic(kind, start, end).await
    }

    pub async fn query_statistic(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> f64 {
        self.try_query_statistic(kind, start, end)
            .await
            .unwrap_or_else(|e| {
                warn!("Statistic query for {:?} failed: {}", kind, e);
                0.0
            })
    }

    pub async fn try_query_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<WorkoutSession>, HealthError> {
        if !self.store.is_available() {
            return Err(HealthError::Unavailable);
        }
        self.store.query_sessions(start, end, limit).await
    }

    pub async fn query_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Vec<WorkoutSession> {
        match self.try_query_sessions(start, end, limit).await {
            Ok(sessions) => {
                debug!(
                    "Fetched {} sessions between {} and {}",
                    sessions.len(),
                    start,
                    end
                );
                sessions
            }
            Err(e) => {
                warn!("Workout query failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Totals from the start of `now`'s calendar day up to `now`.
    ///
    /// The four queries run concurrently and are joined before returning.
    pub async fn fetch_statistics(&self, now: DateTime<Utc>) -> HealthStatistics {
        let today = day_range(&self.offset, now);
        let (steps, distance, calories, sessions) = tokio::join!(
            self.query_statistic(QuantityKind::StepCount, today.start, today.end),
            self.query_statistic(QuantityKind::DistanceWalkingRunning, today.start, today.end),
            self.query_statistic(QuantityKind::ActiveEnergyBurned, today.start, today.end),
            self.query_sessions(today.start, today.end, None),
        );

        HealthStatistics {
            steps: steps as u64,
            distance_km: distance / 1000.0,
            calories,
            workouts: sessions.len(),
        }
    }

    pub async fn fetch_today_workouts(&self, now: DateTime<Utc>) -> Vec<WorkoutSession> {
        let today = day_range(&self.offset, now);
        self.query_sessions(today.start, today.end, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ActivityCategory;
    use crate::health::memory::{HealthExport, InMemoryHealthStore};
    use crate::health::QuantitySample;
    use chrono::TimeZone;

    struct BrokenStore;

    impl HealthStore for BrokenStore {
        fn is_available(&self) -> bool {
            true
        }

        async fn request_authorization(
            &self,
            _read: &[HealthDataType],
        ) -> Result<bool, HealthError> {
            Err(HealthError::QueryFailed("denied by policy".into()))
        }

        async fn query_statistic(
            &self,
            kind: QuantityKind,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<f64, HealthError> {
            Err(HealthError::NotAuthorized(HealthDataType::Quantity(kind)))
        }

        async fn query_sessions(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _limit: Option<usize>,
        ) -> Result<Vec<WorkoutSession>, HealthError> {
            Err(HealthError::QueryFailed("store offline".into()))
        }
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, m, 0).unwrap()
    }

    fn sample(
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        value: f64,
    ) -> QuantitySample {
        QuantitySample {
            kind,
            start,
            end,
            value,
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_and_zero() {
        let accessor = WorkoutStoreAccessor::new(BrokenStore);
        assert!(!accessor.authorize().await);
        assert_eq!(
            accessor
                .query_statistic(QuantityKind::StepCount, at(1, 0, 0), at(2, 0, 0))
                .await,
            0.0
        );
        assert!(
            accessor
                .query_sessions(at(1, 0, 0), at(2, 0, 0), None)
                .await
                .is_empty()
        );
        assert_eq!(
            accessor.fetch_statistics(at(1, 12, 0)).await,
            HealthStatistics::default()
        );
    }

    #[tokio::test]
    async fn try_variants_keep_the_error() {
        let accessor = WorkoutStoreAccessor::new(BrokenStore);
        let err = accessor
            .try_query_sessions(at(1, 0, 0), at(2, 0, 0), Some(5))
            .await
            .unwrap_err();
        assert_eq!(err, HealthError::QueryFailed("store offline".into()));

        let err = accessor
            .try_query_statistic(QuantityKind::ActiveEnergyBurned, at(1, 0, 0), at(2, 0, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, HealthError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn unavailable_store_is_never_queried() {
        let store = InMemoryHealthStore::unavailable();
        let accessor = WorkoutStoreAccessor::new(store);
        assert!(!accessor.authorize().await);
        assert_eq!(
            accessor
                .try_query_sessions(at(1, 0, 0), at(2, 0, 0), None)
                .await
                .unwrap_err(),
            HealthError::Unavailable
        );
    }

    #[tokio::test]
    async fn statistics_cover_only_today() {
        let export = HealthExport {
            workouts: vec![
                WorkoutSession::new(
                    ActivityCategory::Soccer,
                    at(3, 9, 0),
                    at(3, 10, 30),
                    600.0,
                    7000.0,
                ),
                WorkoutSession::new(
                    ActivityCategory::Running,
                    at(2, 18, 0),
                    at(2, 18, 40),
                    400.0,
                    6000.0,
                ),
            ],
            samples: vec![
                sample(QuantityKind::StepCount, at(3, 8, 0), at(3, 9, 0), 1200.0),
                sample(QuantityKind::StepCount, at(3, 11, 0), at(3, 12, 0), 800.7),
                sample(QuantityKind::StepCount, at(2, 11, 0), at(2, 12, 0), 9999.0),
                sample(QuantityKind::DistanceWalkingRunning, at(3, 9, 0), at(3, 10, 0), 2500.0),
                sample(QuantityKind::ActiveEnergyBurned, at(3, 9, 0), at(3, 10, 0), 321.0),
                sample(QuantityKind::ActiveEnergyBurned, at(3, 22, 0), at(3, 23, 0), 50.0),
            ],
            authorized: true,
        };
        let accessor = WorkoutStoreAccessor::new(InMemoryHealthStore::from_export(export));
        assert!(accessor.authorize().await);

        let stats = accessor.fetch_statistics(at(3, 12, 0)).await;
        assert_eq!(stats.steps, 2000);
        assert_eq!(stats.distance_km, 2.5);
        assert_eq!(stats.calories, 321.0);
        assert_eq!(stats.workouts, 1);

        let today = accessor.fetch_today_workouts(at(3, 12, 0)).await;
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].activity, ActivityCategory::Soccer);
    }

    #[tokio::test]
    async fn day_boundary_follows_the_offset() {
        // 23:30 UTC on the 2nd is already the 3rd at UTC+9.
        let export = HealthExport {
            workouts: vec![WorkoutSession::new(
                ActivityCategory::Walking,
                at(2, 23, 30),
                at(2, 23, 50),
                80.0,
                1500.0,
            )],
            samples: Vec::new(),
            authorized: true,
        };
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        let accessor =
            WorkoutStoreAccessor::with_offset(InMemoryHealthStore::from_export(export), seoul);
        assert_eq!(accessor.fetch_today_workouts(at(3, 1, 0)).await.len(), 1);

        let utc_accessor = WorkoutStoreAccessor::new(InMemoryHealthStore::from_export(
            accessor.store().export().clone(),
        ));
        assert!(utc_accessor.fetch_today_workouts(at(3, 1, 0)).await.is_empty());
    }
}

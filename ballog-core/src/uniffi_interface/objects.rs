use chrono::DateTime;
use log::debug;
use uuid::Uuid;

use crate::health::{ActivityCategory, WorkoutSession as CoreWorkoutSession};
use crate::session::{CategoryStats, DateRange, WorkoutStats, WorkoutSummary};
use crate::uniffi_interface::errors::BallogError;

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWorkoutSession {
    /// UUID string; blank means "generate one".
    pub id: String,
    pub activity: ActivityCategory,
    /// Unix milliseconds.
    pub start_ms: i64,
    pub end_ms: i64,
    pub calories: f64,
    pub distance: f64,
}

impl From<CoreWorkoutSession> for FfiWorkoutSession {
    fn from(s: CoreWorkoutSession) -> Self {
        FfiWorkoutSession {
            id: s.id.to_string(),
            activity: s.activity,
            start_ms: s.start.timestamp_millis(),
            end_ms: s.end.timestamp_millis(),
            calories: s.calories,
            distance: s.distance,
        }
    }
}

impl TryFrom<FfiWorkoutSession> for CoreWorkoutSession {
    type Error = BallogError;

    fn try_from(s: FfiWorkoutSession) -> Result<Self, BallogError> {
        let id = if s.id.trim().is_empty() {
            Uuid::new_v4()
        } else {
            Uuid::parse_str(s.id.trim())
                .map_err(|e| BallogError::Common(format!("invalid session id {}: {}", s.id, e)))?
        };
        let start = DateTime::from_timestamp_millis(s.start_ms)
            .ok_or_else(|| BallogError::Common(format!("start out of range: {}", s.start_ms)))?;
        let end = DateTime::from_timestamp_millis(s.end_ms)
            .ok_or_else(|| BallogError::Common(format!("end out of range: {}", s.end_ms)))?;
        debug!("Converted FFI session {} ({})", id, s.activity);
        Ok(CoreWorkoutSession {
            id,
            activity: s.activity,
            start,
            end,
            calories: s.calories,
            distance: s.distance,
        })
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWorkoutStats {
    pub count: u64,
    pub total_duration: f64,
    pub average_duration: f64,
    pub total_calories: f64,
    pub total_distance: f64,
}

impl From<WorkoutStats> for FfiWorkoutStats {
    fn from(s: WorkoutStats) -> Self {
        FfiWorkoutStats {
            count: s.count as u64,
            total_duration: s.total_duration,
            average_duration: s.average_duration,
            total_calories: s.total_calories,
            total_distance: s.total_distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWorkoutSummary {
    pub count: u64,
    pub total_duration: f64,
    pub most_frequent: Option<ActivityCategory>,
}

impl From<WorkoutSummary> for FfiWorkoutSummary {
    fn from(s: WorkoutSummary) -> Self {
        FfiWorkoutSummary {
            count: s.count as u64,
            total_duration: s.total_duration,
            most_frequent: s.most_frequent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCategoryStats {
    pub activity: ActivityCategory,
    pub stats: FfiWorkoutStats,
}

impl From<CategoryStats> for FfiCategoryStats {
    fn from(c: CategoryStats) -> Self {
        FfiCategoryStats {
            activity: c.activity,
            stats: c.stats.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, uniffi::Record)]
pub struct FfiDateRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl From<DateRange> for FfiDateRange {
    fn from(r: DateRange) -> Self {
        FfiDateRange {
            start_ms: r.start.timestamp_millis(),
            end_ms: r.end.timestamp_millis(),
        }
    }
}

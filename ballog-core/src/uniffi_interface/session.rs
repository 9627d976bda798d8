use chrono::FixedOffset;

use crate::health::{ActivityCategory, WorkoutSession};
use crate::session::{self, month_range};
use crate::uniffi_interface::errors::BallogError;
use crate::uniffi_interface::objects::{
    FfiCategoryStats, FfiDateRange, FfiWorkoutSession, FfiWorkoutStats, FfiWorkoutSummary,
};

fn into_sessions(sessions: Vec<FfiWorkoutSession>) -> Result<Vec<WorkoutSession>, BallogError> {
    sessions.into_iter().map(WorkoutSession::try_from).collect()
}

#[uniffi::export]
pub fn calculate_workout_stats(
    sessions: Vec<FfiWorkoutSession>,
) -> Result<FfiWorkoutStats, BallogError> {
    let sessions = into_sessions(sessions)?;
    Ok(session::calculate_stats(&sessions).into())
}

#[uniffi::export]
pub fn summarize_workouts(
    sessions: Vec<FfiWorkoutSession>,
) -> Result<FfiWorkoutSummary, BallogError> {
    let sessions = into_sessions(sessions)?;
    Ok(session::summarize(&sessions).into())
}

#[uniffi::export]
pub fn filter_workouts_by_activity(
    sessions: Vec<FfiWorkoutSession>,
    activity: ActivityCategory,
) -> Result<Vec<FfiWorkoutSession>, BallogError> {
    let sessions = into_sessions(sessions)?;
    Ok(session::filter_by_category(&sessions, activity)
        .into_iter()
        .map(FfiWorkoutSession::from)
        .collect())
}

#[uniffi::export]
pub fn workout_category_breakdown(
    sessions: Vec<FfiWorkoutSession>,
) -> Result<Vec<FfiCategoryStats>, BallogError> {
    let sessions = into_sessions(sessions)?;
    Ok(session::category_breakdown(&sessions)
        .into_iter()
        .map(FfiCategoryStats::from)
        .collect())
}

/// First and last instant of a month for a device `utc_offset_minutes` east
/// of UTC.
#[uniffi::export]
pub fn month_bounds(
    year: i32,
    month: u32,
    utc_offset_minutes: i32,
) -> Result<FfiDateRange, BallogError> {
    let offset = utc_offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| BallogError::Common(format!("invalid UTC offset {}", utc_offset_minutes)))?;
    Ok(month_range(&offset, year, month)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ffi(id: &str, activity: ActivityCategory, start_ms: i64, secs: i64) -> FfiWorkoutSession {
        FfiWorkoutSession {
            id: id.to_string(),
            activity,
            start_ms,
            end_ms: start_ms + secs * 1000,
            calories: 10.0,
            distance: 100.0,
        }
    }

    #[test]
    fn stats_and_summary_through_ffi() {
        let base = 1_709_280_000_000;
        let sessions = vec![
            ffi("", ActivityCategory::Soccer, base, 10),
            ffi("", ActivityCategory::Soccer, base + 60_000, 20),
            ffi("", ActivityCategory::Swimming, base + 120_000, 30),
        ];
        let stats = calculate_workout_stats(sessions.clone()).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_duration, 60.0);
        assert_eq!(stats.average_duration, 20.0);

        let summary = summarize_workouts(sessions).unwrap();
        assert_eq!(summary.most_frequent, Some(ActivityCategory::Soccer));
    }

    #[test]
    fn filter_keeps_supplied_ids() {
        let id = "6f1c0a52-8a4e-4f53-9d3e-1c1b9d8f7a10";
        let sessions = vec![
            ffi(id, ActivityCategory::Soccer, 0, 60),
            ffi("", ActivityCategory::Yoga, 0, 60),
        ];
        let soccer = filter_workouts_by_activity(sessions, ActivityCategory::Soccer).unwrap();
        assert_eq!(soccer.len(), 1);
        assert_eq!(soccer[0].id, id);
    }

    #[test]
    fn bad_ids_and_months_are_errors() {
        assert!(calculate_workout_stats(vec![ffi("nope", ActivityCategory::Other, 0, 1)]).is_err());
        assert!(month_bounds(2024, 13, 0).is_err());
        assert!(month_bounds(2024, 2, 24 * 60).is_err());
    }

    #[test]
    fn month_bounds_in_milliseconds() {
        let range = month_bounds(2024, 2, 0).unwrap();
        assert_eq!(range.start_ms, 1_706_745_600_000);
        assert_eq!(range.end_ms, 1_709_251_199_999);
    }
}

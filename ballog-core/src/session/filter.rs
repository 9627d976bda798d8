//! Narrowing sessions by calendar month and activity category.

use chrono::{DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use log::warn;

use crate::error::CalendarError;
use crate::health::store::{HealthStore, WorkoutStoreAccessor};
use crate::health::{ActivityCategory, WorkoutSession};

/// Inclusive range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

fn to_utc(
    offset: &FixedOffset,
    local: NaiveDateTime,
    err: CalendarError,
) -> Result<DateTime<Utc>, CalendarError> {
    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(err)
}

/// First to last instant of `year`-`month` on the calendar of `offset`.
///
/// The last day is found by stepping one month past the first and back one
/// day, so month lengths and leap years need no special casing.
pub fn month_range(
    offset: &FixedOffset,
    year: i32,
    month: u32,
) -> Result<DateRange, CalendarError> {
    let invalid = CalendarError::InvalidMonth { year, month };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| invalid.clone())?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| invalid.clone())?;
    let last_instant = last
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| invalid.clone())?;

    Ok(DateRange {
        start: to_utc(offset, first.and_time(NaiveTime::MIN), invalid.clone())?,
        end: to_utc(offset, last_instant, invalid)?,
    })
}

/// From the start of `now`'s day on the calendar of `offset` up to `now`.
pub fn day_range(offset: &FixedOffset, now: DateTime<Utc>) -> DateRange {
    let since_midnight = now
        .with_timezone(offset)
        .time()
        .signed_duration_since(NaiveTime::MIN);
    DateRange {
        start: now - since_midnight,
        end: now,
    }
}

/// Sessions of `activity`, in their original order.
pub fn filter_by_category(
    sessions: &[WorkoutSession],
    activity: ActivityCategory,
) -> Vec<WorkoutSession> {
    sessions
        .iter()
        .filter(|s| s.activity == activity)
        .cloned()
        .collect()
}

impl<S: HealthStore> WorkoutStoreAccessor<S> {
    /// All sessions started during the given month, most recent first.
    pub async fn sessions_for_month(&self, year: i32, month: u32) -> Vec<WorkoutSession> {
        match month_range(&self.offset(), year, month) {
            Ok(range) => self.query_sessions(range.start, range.end, None).await,
            Err(e) => {
                warn!("Skipping month query: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn sessions_for_month_by_category(
        &self,
        year: i32,
        month: u32,
        activity: ActivityCategory,
    ) -> Vec<WorkoutSession> {
        let sessions = self.sessions_for_month(year, month).await;
        filter_by_category(&sessions, activity)
    }
}

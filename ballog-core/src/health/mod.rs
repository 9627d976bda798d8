//! Device health data: workout sessions, quantity samples and the store
//! boundary they come through.

pub mod memory;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification tag of a recorded workout.
///
/// Declaration order doubles as the tie-break order when two categories are
/// equally frequent in a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Running,
    Walking,
    Cycling,
    Soccer,
    TraditionalStrengthTraining,
    FunctionalStrengthTraining,
    Yoga,
    Swimming,
    Other,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 9] = [
        ActivityCategory::Running,
        ActivityCategory::Walking,
        ActivityCategory::Cycling,
        ActivityCategory::Soccer,
        ActivityCategory::TraditionalStrengthTraining,
        ActivityCategory::FunctionalStrengthTraining,
        ActivityCategory::Yoga,
        ActivityCategory::Swimming,
        ActivityCategory::Other,
    ];

    /// Human readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ActivityCategory::Running => "Running",
            ActivityCategory::Walking => "Walking",
            ActivityCategory::Cycling => "Cycling",
            ActivityCategory::Soccer => "Soccer",
            ActivityCategory::TraditionalStrengthTraining => "Strength Training",
            ActivityCategory::FunctionalStrengthTraining => "Core / Circuit",
            ActivityCategory::Yoga => "Yoga",
            ActivityCategory::Swimming => "Swimming",
            ActivityCategory::Other => "Other",
        }
    }

    /// Identifier used in JSON exports and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Running => "running",
            ActivityCategory::Walking => "walking",
            ActivityCategory::Cycling => "cycling",
            ActivityCategory::Soccer => "soccer",
            ActivityCategory::TraditionalStrengthTraining => "traditional_strength_training",
            ActivityCategory::FunctionalStrengthTraining => "functional_strength_training",
            ActivityCategory::Yoga => "yoga",
            ActivityCategory::Swimming => "swimming",
            ActivityCategory::Other => "other",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        ActivityCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown activity category '{}'", s))
    }
}

/// One recorded workout as reported by the device.
///
/// Sessions are never mutated once mapped from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub activity: ActivityCategory,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Active energy in kcal.
    #[serde(default)]
    pub calories: f64,
    /// Distance in meters.
    #[serde(default)]
    pub distance: f64,
}

impl WorkoutSession {
    pub fn new(
        activity: ActivityCategory,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        calories: f64,
        distance: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity,
            start,
            end,
            calories,
            distance,
        }
    }

    /// Elapsed seconds between start and end.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

impl fmt::Display for WorkoutSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {:.0} min, {:.2} km, {:.0} kcal",
            self.start.format("%Y-%m-%d %H:%M"),
            self.activity.display_name(),
            self.duration() / 60.0,
            self.distance / 1000.0,
            self.calories
        )
    }
}

/// Cumulative quantities the store can sum over a time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    StepCount,
    /// Meters.
    DistanceWalkingRunning,
    /// Kilocalories.
    ActiveEnergyBurned,
}

/// Read scopes requested from the device store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthDataType {
    Quantity(QuantityKind),
    Workouts,
}

impl HealthDataType {
    pub const READ_SCOPES: [HealthDataType; 4] = [
        HealthDataType::Quantity(QuantityKind::StepCount),
        HealthDataType::Quantity(QuantityKind::DistanceWalkingRunning),
        HealthDataType::Quantity(QuantityKind::ActiveEnergyBurned),
        HealthDataType::Workouts,
    ];
}

impl fmt::Display for HealthDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthDataType::Quantity(QuantityKind::StepCount) => write!(f, "step count"),
            HealthDataType::Quantity(QuantityKind::DistanceWalkingRunning) => {
                write!(f, "walking/running distance")
            }
            HealthDataType::Quantity(QuantityKind::ActiveEnergyBurned) => {
                write!(f, "active energy")
            }
            HealthDataType::Workouts => write!(f, "workouts"),
        }
    }
}

/// A single cumulative sample, e.g. 1200 steps between two instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySample {
    pub kind: QuantityKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub value: f64,
}

/// Snapshot of today's activity totals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthStatistics {
    pub steps: u64,
    pub distance_km: f64,
    pub calories: f64,
    pub workouts: usize,
}

impl fmt::Display for HealthStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} steps, {:.2} km, {:.0} kcal, {} workouts",
            self.steps, self.distance_km, self.calories, self.workouts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_parses_loose_spellings() {
        assert_eq!(
            "Soccer".parse::<ActivityCategory>().unwrap(),
            ActivityCategory::Soccer
        );
        assert_eq!(
            "functional-strength-training"
                .parse::<ActivityCategory>()
                .unwrap(),
            ActivityCategory::FunctionalStrengthTraining
        );
        assert!("curling".parse::<ActivityCategory>().is_err());
    }

    #[test]
    fn session_json_without_id_gets_one() {
        let json = r#"{"activity":"yoga","start":"2024-03-01T08:00:00Z","end":"2024-03-01T08:45:30Z"}"#;
        let a: WorkoutSession = serde_json::from_str(json).unwrap();
        let b: WorkoutSession = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.activity, ActivityCategory::Yoga);
        assert_eq!(a.duration(), 2730.0);
        assert_eq!(a.calories, 0.0);
    }

    #[test]
    fn duration_keeps_fractional_seconds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let end = start + chrono::Duration::milliseconds(1500);
        let s = WorkoutSession::new(ActivityCategory::Running, start, end, 0.0, 0.0);
        assert_eq!(s.duration(), 1.5);
    }
}

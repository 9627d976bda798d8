//! Workout summary and statistics generation.

use std::collections::BTreeMap;

use crate::health::{ActivityCategory, WorkoutSession};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkoutStats {
    pub count: usize,
    /// Seconds.
    pub total_duration: f64,
    /// Seconds; zero for an empty input.
    pub average_duration: f64,
    pub total_calories: f64,
    /// Meters.
    pub total_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkoutSummary {
    pub count: usize,
    pub total_duration: f64,
    pub most_frequent: Option<ActivityCategory>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryStats {
    pub activity: ActivityCategory,
    pub stats: WorkoutStats,
}

pub fn calculate_stats(sessions: &[WorkoutSession]) -> WorkoutStats {
    let count = sessions.len();
    let total_duration: f64 = sessions.iter().map(WorkoutSession::duration).sum();
    let average_duration = if count == 0 {
        0.0
    } else {
        total_duration / count as f64
    };

    WorkoutStats {
        count,
        total_duration,
        average_duration,
        total_calories: sessions.iter().map(|s| s.calories).sum(),
        total_distance: sessions.iter().map(|s| s.distance).sum(),
    }
}

/// Count, total duration and the most frequent category.
///
/// Equally frequent categories resolve to the one declared first in
/// [`ActivityCategory`].
pub fn summarize(sessions: &[WorkoutSession]) -> WorkoutSummary {
    let mut activity_counts: BTreeMap<ActivityCategory, usize> = BTreeMap::new();
    for session in sessions {
        *activity_counts.entry(session.activity).or_insert(0) += 1;
    }

    let mut most_frequent: Option<(ActivityCategory, usize)> = None;
    for (activity, count) in activity_counts {
        match most_frequent {
            Some((_, best)) if count <= best => {}
            _ => most_frequent = Some((activity, count)),
        }
    }

    WorkoutSummary {
        count: sessions.len(),
        total_duration: sessions.iter().map(WorkoutSession::duration).sum(),
        most_frequent: most_frequent.map(|(activity, _)| activity),
    }
}

/// Per-category statistics for the categories present, in category order.
pub fn category_breakdown(sessions: &[WorkoutSession]) -> Vec<CategoryStats> {
    let mut by_activity: BTreeMap<ActivityCategory, Vec<WorkoutSession>> = BTreeMap::new();
    for session in sessions {
        by_activity
            .entry(session.activity)
            .or_default()
            .push(session.clone());
    }

    by_activity
        .into_iter()
        .map(|(activity, group)| CategoryStats {
            activity,
            stats: calculate_stats(&group),
        })
        .collect()
}

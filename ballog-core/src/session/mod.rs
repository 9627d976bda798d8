//! Session module for aggregating and narrowing workout sessions.
//!
//! Everything here is a pure transformation over a slice of
//! [`WorkoutSession`](crate::health::WorkoutSession)s, apart from the
//! month queries that go through the
//! [`WorkoutStoreAccessor`](crate::health::store::WorkoutStoreAccessor).

pub mod filter;
pub mod summary;

pub use filter::{DateRange, day_range, filter_by_category, month_range};
pub use summary::{
    CategoryStats, WorkoutStats, WorkoutSummary, calculate_stats, category_breakdown, summarize,
};

//! Error types shared across the core.

use thiserror::Error;

use crate::health::HealthDataType;

/// Failures reported by a [`HealthStore`](crate::health::store::HealthStore).
///
/// The accessor collapses these to empty/zero results; the `try_*` accessor
/// methods hand them back untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HealthError {
    #[error("health data is not available on this device")]
    Unavailable,
    #[error("read access to {0} has not been granted")]
    NotAuthorized(HealthDataType),
    #[error("health query failed: {0}")]
    QueryFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("{year}-{month:02} is not a valid calendar month")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account '{0}' already exists")]
    AlreadyExists(String),
    #[error("username must not be blank")]
    InvalidUsername,
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of minutes, got '{value}'")]
    InvalidOffset { name: &'static str, value: String },
    #[error("UTC offset of {0} minutes is out of range")]
    OffsetOutOfRange(i32),
    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

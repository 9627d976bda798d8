pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod logging;
pub mod runtime;
pub mod session;

pub use account::{Account, AccountDirectory, LocalAccountStore, Registration};
pub use config::Config;
pub use error::{AccountError, CalendarError, ConfigError, HealthError};
pub use health::store::{HealthStore, WorkoutStoreAccessor};
pub use health::{ActivityCategory, HealthStatistics, QuantityKind, WorkoutSession};
pub use session::{WorkoutStats, WorkoutSummary, calculate_stats, summarize};

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;

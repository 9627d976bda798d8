//! Runtime configuration read from the environment.

use std::env;

use chrono::{FixedOffset, Offset, Utc};
use log::LevelFilter;

use crate::error::ConfigError;
use crate::logging::parse_level;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const UTC_OFFSET_VAR: &str = "BALLOG_UTC_OFFSET_MINUTES";
pub const LOG_LEVEL_VAR: &str = "BALLOG_LOG";

const DEFAULT_DATABASE_URL: &str = "ballog.db";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    /// Calendar used for "today" and month boundaries.
    pub utc_offset: FixedOffset,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            utc_offset: Utc.fix(),
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source; unset variables keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(url) = lookup(DATABASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            config.database_url = url;
        }

        if let Some(raw) = lookup(UTC_OFFSET_VAR) {
            let minutes: i32 = raw.trim().parse().map_err(|_| ConfigError::InvalidOffset {
                name: UTC_OFFSET_VAR,
                value: raw.clone(),
            })?;
            config.utc_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or(ConfigError::OffsetOutOfRange(minutes))?;
        }

        if let Some(raw) = lookup(LOG_LEVEL_VAR) {
            config.log_level = parse_level(&raw).ok_or(ConfigError::InvalidLogLevel(raw))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database_url, "ballog.db");
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            (DATABASE_URL_VAR, "/tmp/accounts.db"),
            (UTC_OFFSET_VAR, "540"),
            (LOG_LEVEL_VAR, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "/tmp/accounts.db");
        assert_eq!(config.utc_offset.local_minus_utc(), 9 * 3600);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_offsets_and_levels() {
        assert!(matches!(
            Config::from_lookup(lookup(&[(UTC_OFFSET_VAR, "nine")])),
            Err(ConfigError::InvalidOffset { .. })
        ));
        assert_eq!(
            Config::from_lookup(lookup(&[(UTC_OFFSET_VAR, "1500")])),
            Err(ConfigError::OffsetOutOfRange(1500))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")])),
            Err(ConfigError::InvalidLogLevel("loud".into()))
        );
    }
}

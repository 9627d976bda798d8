//! A [`HealthStore`] backed by an exported snapshot of device records.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::HealthError;
use crate::health::store::HealthStore;
use crate::health::{HealthDataType, QuantityKind, QuantitySample, WorkoutSession};

fn default_authorized() -> bool {
    true
}

/// On-disk shape of a health export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthExport {
    #[serde(default)]
    pub workouts: Vec<WorkoutSession>,
    #[serde(default)]
    pub samples: Vec<QuantitySample>,
    /// Whether the exporting user granted read access.
    #[serde(default = "default_authorized")]
    pub authorized: bool,
}

pub struct InMemoryHealthStore {
    export: HealthExport,
    available: bool,
}

impl InMemoryHealthStore {
    pub fn from_export(export: HealthExport) -> Self {
        Self {
            export,
            available: true,
        }
    }

    /// A store on a device without health data support.
    pub fn unavailable() -> Self {
        Self {
            export: HealthExport::default(),
            available: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let export: HealthExport =
            serde_json::from_str(json).context("Failed to parse health export")?;
        Ok(Self::from_export(export))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read health export {}", path.display()))?;
        let store = Self::from_json(&json)?;
        info!(
            "Loaded {} workouts and {} samples from {}",
            store.export.workouts.len(),
            store.export.samples.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn export(&self) -> &HealthExport {
        &self.export
    }

    fn ensure_authorized(&self, scope: HealthDataType) -> Result<(), HealthError> {
        if self.export.authorized {
            Ok(())
        } else {
            Err(HealthError::NotAuthorized(scope))
        }
    }
}

impl HealthStore for InMemoryHealthStore {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn request_authorization(&self, read: &[HealthDataType]) -> Result<bool, HealthError> {
        if !self.available {
            return Err(HealthError::Unavailable);
        }
        debug!("Authorization requested for {} scopes", read.len());
        Ok(self.export.authorized)
    }

    async fn query_statistic(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<f64, HealthError> {
        self.ensure_authorized(HealthDataType::Quantity(kind))?;
        Ok(self
            .export
            .samples
            .iter()
            .filter(|s| s.kind == kind && s.start >= start && s.start <= end)
            .map(|s| s.value)
            .sum())
    }

    async fn query_sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<WorkoutSession>, HealthError> {
        self.ensure_authorized(HealthDataType::Workouts)?;
        let mut sessions: Vec<WorkoutSession> = self
            .export
            .workouts
            .iter()
            .filter(|w| w.start >= start && w.start <= end)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.end.cmp(&a.end));
        if let Some(limit) = limit {
            sessions.truncate(limit);
        }
        Ok(sessions)
    }
}

//! Readings provider - the read contract the detector consumes

use crate::{Measurement, MeasurementIssue, TimeRange};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid reading: {0}")]
    InvalidReading(#[from] MeasurementIssue),

    #[error("readings store lock poisoned")]
    Poisoned,
}

/// Which readings to fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingQuery {
    #[serde(default)]
    pub meter_code: Option<String>,

    #[serde(default)]
    pub time_range: Option<TimeRange>,

    // keeps the most recent N after time filtering
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ReadingQuery {
    pub fn for_meter(meter_code: impl Into<String>) -> Self {
        Self {
            meter_code: Some(meter_code.into()),
            ..Default::default()
        }
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, m: &Measurement) -> bool {
        self.meter_code.as_deref().is_none_or(|code| m.meter_code == code)
            && self.time_range.is_none_or(|r| r.contains(m.timestamp))
    }
}

/// Source of measurements, ascending by timestamp.
///
/// Every call returns its own snapshot; implementations must never hand out
/// a view that can change while a detection run is reading it.
pub trait ReadingsProvider: Send + Sync {
    fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Measurement>, ProviderError>;
}

/// Thread-safe in-memory store, kept sorted by timestamp.
#[derive(Debug, Default)]
pub struct InMemoryReadings {
    readings: RwLock<Vec<Measurement>>,
}

impl InMemoryReadings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings<I>(readings: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = Measurement>,
    {
        let store = Self::new();
        for m in readings {
            store.insert(m)?;
        }
        Ok(store)
    }

    // insert a reading, keeping ascending timestamp order
    // equal timestamps keep arrival order
    pub fn insert(&self, measurement: Measurement) -> Result<(), ProviderError> {
        measurement.validate()?;

        let mut readings = self.readings.write().map_err(|_| ProviderError::Poisoned)?;
        let pos = readings.partition_point(|r| r.timestamp <= measurement.timestamp);
        readings.insert(pos, measurement);
        Ok(())
    }

    pub fn count(&self, meter_code: Option<&str>) -> Result<usize, ProviderError> {
        let readings = self.readings.read().map_err(|_| ProviderError::Poisoned)?;
        let total = match meter_code {
            Some(code) => readings.iter().filter(|r| r.meter_code == code).count(),
            None => readings.len(),
        };
        Ok(total)
    }
}

impl ReadingsProvider for InMemoryReadings {
    fn fetch(&self, query: &ReadingQuery) -> Result<Vec<Measurement>, ProviderError> {
        let readings = self.readings.read().map_err(|_| ProviderError::Poisoned)?;

        let mut selected: Vec<Measurement> = readings
            .iter()
            .filter(|m| query.matches(m))
            .cloned()
            .collect();

        if let Some(limit) = query.limit {
            if selected.len() > limit {
                selected.drain(..selected.len() - limit);
            }
        }

        Ok(selected)
    }
}

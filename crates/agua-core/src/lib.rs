//! Core types for the water-meter readings pipeline
//! shared by the detector and the API service.
pub mod provider;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use provider::{InMemoryReadings, ProviderError, ReadingQuery, ReadingsProvider};

// MEASUREMENT //

/// One flow-rate observation from a meter.
///
/// Identity is the pair (`meter_code`, `timestamp`). Nothing in this crate
/// deduplicates measurements; that stays the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub meter_code: String,        // opaque meter identifier
    pub timestamp: DateTime<Utc>,  // when the reading was taken
    pub flow_value: f64,           // flow rate, L/min
}

impl Measurement {
    pub fn new(meter_code: impl Into<String>, timestamp: DateTime<Utc>, flow_value: f64) -> Self {
        Self {
            meter_code: meter_code.into(),
            timestamp,
            flow_value,
        }
    }

    /// Check the fields that can be malformed on their own.
    ///
    /// Ordering against neighbouring readings is checked by the consumer,
    /// since it depends on the sequence rather than the record.
    pub fn validate(&self) -> Result<(), MeasurementIssue> {
        if self.meter_code.trim().is_empty() {
            return Err(MeasurementIssue::EmptyMeterCode);
        }
        if !self.flow_value.is_finite() {
            return Err(MeasurementIssue::NonFiniteFlow(self.flow_value));
        }
        Ok(())
    }
}

/// Why a single measurement was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasurementIssue {
    #[error("meter code is empty")]
    EmptyMeterCode,

    #[error("flow value {0} is not a finite number")]
    NonFiniteFlow(f64),

    #[error("timestamp {timestamp} is earlier than the previous reading at {previous}")]
    OutOfOrder {
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}

// TIME RANGE //

/// Optional inclusive bounds on a timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self::new(Some(start), None)
    }

    pub fn until(end: DateTime<Utc>) -> Self {
        Self::new(None, Some(end))
    }

    /// true when neither bound is set
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// a range whose start lies after its end can never match anything
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| ts >= s) && self.end.is_none_or(|e| ts <= e)
    }
}

//! Error types for detection runs

use agua_core::MeasurementIssue;
use thiserror::Error;

/// Everything a caller can get wrong when asking for a detection run.
///
/// None of these are retried and none come with partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// window size or threshold out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unsupported detection method '{0}' (expected 'zscore' or 'iqr')")]
    UnsupportedMethod(String),

    /// a single input record is malformed; `index` points into the caller's slice
    #[error("invalid measurement at index {index} (meter '{meter_code}'): {issue}")]
    InvalidMeasurement {
        index: usize,
        meter_code: String,
        issue: MeasurementIssue,
    },
}

impl DetectionError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DetectionError>;

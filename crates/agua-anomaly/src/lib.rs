//! Água anomaly detection
//!
//! Flags flow readings that deviate from each meter's own recent history,
//! using a rolling z-score or a rolling interquartile-range rule.

pub mod config;
pub mod detection;
pub mod error;
pub mod report;
pub mod stats;
pub mod strategy;

pub use config::{DetectionConfig, Method};
pub use detection::{AnnotatedResult, AnomalyDetector, detect};
pub use error::{DetectionError, Result};
pub use report::{MeterSummary, anomalies_only, summarize};
pub use strategy::{Classification, Strategy, WindowClassifier, WindowStats};

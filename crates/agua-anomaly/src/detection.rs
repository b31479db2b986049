//! Per-meter rolling anomaly detection

use agua_core::{Measurement, MeasurementIssue};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::config::DetectionConfig;
use crate::error::{DetectionError, Result};
use crate::strategy::{Classification, Strategy, WindowClassifier, WindowStats};

/// A measurement plus the verdict of one detection run.
///
/// `stats` and `score` are `None` while the meter has fewer than
/// `window_size` earlier readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedResult {
    #[serde(flatten)]
    pub measurement: Measurement,

    #[serde(flatten)]
    pub stats: Option<WindowStats>,

    pub score: Option<f64>,

    pub is_anomaly: bool,
}

impl AnnotatedResult {
    fn not_evaluated(measurement: Measurement) -> Self {
        Self {
            measurement,
            stats: None,
            score: None,
            is_anomaly: false,
        }
    }

    fn evaluated(measurement: Measurement, c: Classification) -> Self {
        Self {
            measurement,
            stats: Some(c.stats),
            score: Some(c.score),
            is_anomaly: c.is_anomaly,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.stats.is_some()
    }

    pub fn meter_code(&self) -> &str {
        &self.measurement.meter_code
    }
}

// main anomaly detector
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectionConfig,
    strategy: Strategy,
}

impl AnomalyDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        let strategy = Strategy::new(config.method, config.threshold);
        Ok(Self { config, strategy })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Annotate every selected measurement.
    ///
    /// Output is grouped by meter in order of first appearance; within a
    /// meter the input order is kept.
    pub fn detect(&self, measurements: &[Measurement]) -> Result<Vec<AnnotatedResult>> {
        validate_measurements(measurements)?;

        let selected = self.select(measurements);
        let partitions = partition_by_meter(&selected);
        let window_size = self.config.window_size;

        let mut results = Vec::with_capacity(selected.len());
        for (meter_code, points) in &partitions {
            let values: Vec<f64> = points.iter().map(|m| m.flow_value).collect();
            let before = results.len();

            for (i, m) in points.iter().enumerate() {
                let result = if i < window_size {
                    AnnotatedResult::not_evaluated((*m).clone())
                } else {
                    let c = self.strategy.classify(&values[i - window_size..i], values[i]);
                    AnnotatedResult::evaluated((*m).clone(), c)
                };
                results.push(result);
            }

            debug!(
                meter_code = %meter_code,
                points = points.len(),
                anomalies = results[before..].iter().filter(|r| r.is_anomaly).count(),
                "Meter evaluated"
            );
        }

        debug!(
            method = %self.config.method,
            window_size,
            threshold = self.config.threshold,
            meters = partitions.len(),
            points = results.len(),
            "Detection finished"
        );

        Ok(results)
    }

    // apply time range, then keep the `limit` most recent readings
    // ties on timestamp favour the later input position
    fn select<'a>(&self, measurements: &'a [Measurement]) -> Vec<&'a Measurement> {
        let in_range: Vec<&Measurement> = measurements
            .iter()
            .filter(|m| self.config.time_range.is_none_or(|r| r.contains(m.timestamp)))
            .collect();

        let Some(limit) = self.config.limit else {
            return in_range;
        };
        if in_range.len() <= limit {
            return in_range;
        }

        let mut newest: Vec<usize> = (0..in_range.len()).collect();
        newest.sort_by(|&a, &b| {
            in_range[b]
                .timestamp
                .cmp(&in_range[a].timestamp)
                .then(b.cmp(&a))
        });

        let mut keep = vec![false; in_range.len()];
        for &idx in &newest[..limit] {
            keep[idx] = true;
        }

        in_range
            .into_iter()
            .zip(keep)
            .filter_map(|(m, kept)| kept.then_some(m))
            .collect()
    }
}

/// Run one detection pass with a throwaway [`AnomalyDetector`].
pub fn detect(measurements: &[Measurement], config: &DetectionConfig) -> Result<Vec<AnnotatedResult>> {
    AnomalyDetector::new(config.clone())?.detect(measurements)
}

// reject malformed records before any work is done
fn validate_measurements(measurements: &[Measurement]) -> Result<()> {
    let mut last_seen: HashMap<&str, &Measurement> = HashMap::new();

    for (index, m) in measurements.iter().enumerate() {
        let invalid = |issue| DetectionError::InvalidMeasurement {
            index,
            meter_code: m.meter_code.clone(),
            issue,
        };

        m.validate().map_err(invalid)?;

        if let Some(prev) = last_seen.get(m.meter_code.as_str()) {
            if m.timestamp < prev.timestamp {
                return Err(invalid(MeasurementIssue::OutOfOrder {
                    timestamp: m.timestamp,
                    previous: prev.timestamp,
                }));
            }
        }
        last_seen.insert(m.meter_code.as_str(), m);
    }
    Ok(())
}

// group by meter, keeping first-seen order of meters and input order within each
fn partition_by_meter<'a>(measurements: &[&'a Measurement]) -> Vec<(&'a str, Vec<&'a Measurement>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<(&str, Vec<&Measurement>)> = Vec::new();

    for &m in measurements {
        let slot = *index.entry(m.meter_code.as_str()).or_insert_with(|| {
            partitions.push((m.meter_code.as_str(), Vec::new()));
            partitions.len() - 1
        });
        partitions[slot].1.push(m);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(meter: &str, values: &[f64]) -> Vec<Measurement> {
        let start = Utc.with_ymd_and_hms(2025, 11, 2, 16, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Measurement::new(meter, start + Duration::minutes(i as i64), v))
            .collect()
    }

    #[test]
    fn test_partition_keeps_first_seen_order() {
        let mut input = series("B", &[1.0, 2.0]);
        input.insert(1, series("A", &[9.0]).remove(0));
        let refs: Vec<&Measurement> = input.iter().collect();

        let parts = partition_by_meter(&refs);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "B");
        assert_eq!(parts[0].1.len(), 2);
        assert_eq!(parts[1].0, "A");
    }

    #[test]
    fn test_select_limit_ties_prefer_later_input() {
        let mut input = series("A", &[1.0, 2.0, 3.0]);
        let ts = input[2].timestamp;
        input.push(Measurement::new("B", ts, 4.0));

        let config = DetectionConfig::new(crate::Method::ZScore, 2, 3.0).with_limit(1);
        let detector = AnomalyDetector::new(config).unwrap();
        let picked = detector.select(&input);

        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].meter_code, "B");
    }
}

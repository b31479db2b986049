//! Service configuration: TOML file plus environment overrides

use agua_anomaly::Method;
use serde::Deserialize;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

// Main config structure
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // X-API-Key value; empty or missing disables the check
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub detection: DetectionDefaults,

    #[serde(default)]
    pub readings: ReadingsLimits,
}

/// What `/analytics/anomalies` uses when the query leaves a parameter out
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionDefaults {
    #[serde(default = "default_method")]
    pub method: Method,

    #[serde(default = "default_window")]
    pub window: usize,

    #[serde(default = "default_min_window")]
    pub min_window: usize,

    #[serde(default = "default_max_window")]
    pub max_window: usize,

    // |z| cut-off
    #[serde(default = "default_zscore_threshold")]
    pub zscore_threshold: f64,

    #[serde(default = "default_zscore_threshold_range")]
    pub zscore_threshold_range: (f64, f64),

    // fence multiplier
    #[serde(default = "default_iqr_k")]
    pub iqr_k: f64,

    #[serde(default = "default_iqr_k_range")]
    pub iqr_k_range: (f64, f64),

    // readings analysed per request
    #[serde(default = "default_analysis_limit")]
    pub limit: usize,

    // smallest analysis limit a caller may ask for
    #[serde(default = "default_min_analysis_limit")]
    pub min_limit: usize,
}

impl DetectionDefaults {
    pub fn threshold_for(&self, method: Method) -> f64 {
        match method {
            Method::ZScore => self.zscore_threshold,
            Method::Iqr => self.iqr_k,
        }
    }

    /// Thresholds a caller may request for `method`
    pub fn threshold_range(&self, method: Method) -> RangeInclusive<f64> {
        let (lo, hi) = match method {
            Method::ZScore => self.zscore_threshold_range,
            Method::Iqr => self.iqr_k_range,
        };
        lo..=hi
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadingsLimits {
    #[serde(default = "default_readings_limit")]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl ReadingsLimits {
    // clamp a requested limit into 1..=max_limit
    pub fn clamp(&self, requested: Option<usize>, fallback: usize) -> usize {
        self.clamp_from(requested, fallback, 1)
    }

    // clamp a requested limit into floor..=max_limit
    pub fn clamp_from(&self, requested: Option<usize>, fallback: usize, floor: usize) -> usize {
        let ceiling = self.max_limit.max(1);
        requested.unwrap_or(fallback).clamp(floor.clamp(1, ceiling), ceiling)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_key: None,
            detection: DetectionDefaults::default(),
            readings: ReadingsLimits::default(),
        }
    }
}

impl Default for DetectionDefaults {
    fn default() -> Self {
        Self {
            method: default_method(),
            window: default_window(),
            min_window: default_min_window(),
            max_window: default_max_window(),
            zscore_threshold: default_zscore_threshold(),
            zscore_threshold_range: default_zscore_threshold_range(),
            iqr_k: default_iqr_k(),
            iqr_k_range: default_iqr_k_range(),
            limit: default_analysis_limit(),
            min_limit: default_min_analysis_limit(),
        }
    }
}

impl Default for ReadingsLimits {
    fn default() -> Self {
        Self {
            default_limit: default_readings_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl ServiceConfig {
    /// Build from the environment.
    ///
    /// `AGUA_CONFIG` names an optional TOML file; `AGUA_BIND_ADDR` and
    /// `AGUA_API_KEY` override whatever the file says.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("AGUA_CONFIG") {
            Ok(path) if !path.is_empty() => load_config(path)?,
            _ => Self::default(),
        };

        if let Ok(addr) = std::env::var("AGUA_BIND_ADDR") {
            if !addr.is_empty() {
                config.bind_addr = addr;
            }
        }
        if let Ok(key) = std::env::var("AGUA_API_KEY") {
            config.api_key = Some(key);
        }
        Ok(config)
    }

    /// API key, if authentication is switched on
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

// default value helpers for serde
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_method() -> Method {
    Method::ZScore
}

fn default_window() -> usize {
    20
}

fn default_min_window() -> usize {
    5
}

fn default_max_window() -> usize {
    240
}

fn default_zscore_threshold() -> f64 {
    3.0
}

fn default_zscore_threshold_range() -> (f64, f64) {
    (0.5, 10.0)
}

fn default_iqr_k() -> f64 {
    2.0
}

fn default_iqr_k_range() -> (f64, f64) {
    (0.1, 6.0)
}

fn default_analysis_limit() -> usize {
    200
}

fn default_min_analysis_limit() -> usize {
    10
}

fn default_readings_limit() -> usize {
    100
}

fn default_max_limit() -> usize {
    5000
}

// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let toml_content = r#"
bind_addr = "127.0.0.1:8010"

[detection]
method = "iqr"
window = 30
iqr_k = 1.5

[readings]
max_limit = 1000
"#;
        let config: ServiceConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8010");
        assert_eq!(config.detection.method, Method::Iqr);
        assert_eq!(config.detection.window, 30);
        assert_eq!(config.detection.threshold_for(Method::Iqr), 1.5);
        assert_eq!(config.detection.threshold_for(Method::ZScore), 3.0);
        assert_eq!(config.readings.default_limit, 100);
        assert_eq!(config.readings.max_limit, 1000);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.detection.window, 20);
        assert_eq!(config.detection.limit, 200);
    }

    #[test]
    fn test_clamp_limit() {
        let limits = ReadingsLimits::default();
        assert_eq!(limits.clamp(None, 100), 100);
        assert_eq!(limits.clamp(Some(0), 100), 1);
        assert_eq!(limits.clamp(Some(99_999), 100), 5000);

        assert_eq!(limits.clamp_from(Some(3), 200, 10), 10);
        assert_eq!(limits.clamp_from(None, 200, 10), 200);
        assert_eq!(limits.clamp_from(Some(99_999), 200, 10), 5000);
    }

    #[test]
    fn test_threshold_ranges() {
        let config: ServiceConfig = toml::from_str(
            r#"
[detection]
iqr_k_range = [0.5, 3.0]
"#,
        )
        .unwrap();
        let detection = &config.detection;

        assert_eq!(detection.threshold_range(Method::ZScore), 0.5..=10.0);
        assert_eq!(detection.threshold_range(Method::Iqr), 0.5..=3.0);
        assert_eq!(detection.min_limit, 10);
    }

    #[test]
    fn test_empty_api_key_disables_auth() {
        let config = ServiceConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
    }
}

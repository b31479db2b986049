//! Detection configuration

use agua_core::TimeRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DetectionError, Result};

// Detection method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "lowercase")]
pub enum Method {
    ZScore, // rolling mean / population std
    Iqr,    // rolling quartiles with a k * IQR fence
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::ZScore => "zscore",
            Method::Iqr => "iqr",
        }
    }
}

impl FromStr for Method {
    type Err = DetectionError;

    // case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "zscore" => Ok(Method::ZScore),
            "iqr" => Ok(Method::Iqr),
            _ => Err(DetectionError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = DetectionError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully-specified detection run.
///
/// `threshold` is the |z| cut-off for [`Method::ZScore`] and the fence
/// multiplier `k` for [`Method::Iqr`]. There is no `Default`; the API
/// service carries its own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub method: Method,

    // number of preceding readings forming the baseline
    pub window_size: usize,

    pub threshold: f64,

    #[serde(default)]
    pub time_range: Option<TimeRange>,

    // keeps the most recent N readings after time filtering
    #[serde(default)]
    pub limit: Option<usize>,
}

impl DetectionConfig {
    pub fn new(method: Method, window_size: usize, threshold: f64) -> Self {
        Self {
            method,
            window_size,
            threshold,
            time_range: None,
            limit: None,
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

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(DetectionError::invalid_config(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(DetectionError::invalid_config(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        if self.limit == Some(0) {
            return Err(DetectionError::invalid_config("limit must be positive"));
        }
        if self.time_range.is_some_and(|r| r.is_inverted()) {
            return Err(DetectionError::invalid_config(
                "time_range start is after its end",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!("zscore".parse::<Method>().unwrap(), Method::ZScore);
        assert_eq!(" IQR ".parse::<Method>().unwrap(), Method::Iqr);
        assert_eq!(
            "mad".parse::<Method>(),
            Err(DetectionError::UnsupportedMethod("mad".to_string()))
        );
    }

    #[test]
    fn test_load_config_from_toml() {
        let toml_content = r#"
method = "iqr"
window_size = 20
threshold = 2.0
limit = 500

[time_range]
start = "2025-11-02T16:00:00Z"
"#;
        let config: DetectionConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.method, Method::Iqr);
        assert_eq!(config.window_size, 20);
        assert_eq!(config.limit, Some(500));
        assert!(config.time_range.unwrap().end.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_method_in_toml() {
        let toml_content = r#"
method = "isolation_forest"
window_size = 20
threshold = 3.0
"#;
        let err = toml::from_str::<DetectionConfig>(toml_content).unwrap_err();
        assert!(err.to_string().contains("unsupported detection method"));
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let json = serde_json::to_string(&Method::ZScore).unwrap();
        assert_eq!(json, "\"zscore\"");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            DetectionConfig::new(Method::ZScore, 1, 3.0),
            DetectionConfig::new(Method::ZScore, 20, 0.0),
            DetectionConfig::new(Method::Iqr, 20, -1.5),
            DetectionConfig::new(Method::Iqr, 20, f64::NAN),
            DetectionConfig::new(Method::ZScore, 20, 3.0).with_limit(0),
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(DetectionError::InvalidConfiguration(_))
            ));
        }
    }
}

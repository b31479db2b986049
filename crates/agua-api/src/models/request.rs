use agua_core::Measurement;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub const MAX_METER_CODE_LEN: usize = 64;

#[derive(Deserialize)]
pub struct ReadingIn {
    pub meter_code: String,
    pub flow_value: f64,
    // filled in by the server when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReadingIn {
    /// Apply the ingest rules and build the reading to store.
    ///
    /// The code is trimmed and must be 1 to 64 characters; flow must be
    /// strictly positive.
    pub fn into_measurement(self, now: DateTime<Utc>) -> Result<Measurement, String> {
        let meter_code = self.meter_code.trim();
        if meter_code.is_empty() {
            return Err("meter_code must not be empty".to_string());
        }
        let len = meter_code.chars().count();
        if len > MAX_METER_CODE_LEN {
            return Err(format!(
                "meter_code must be at most {MAX_METER_CODE_LEN} characters, got {len}"
            ));
        }
        if !(self.flow_value.is_finite() && self.flow_value > 0.0) {
            return Err(format!("flow_value must be greater than 0, got {}", self.flow_value));
        }

        Ok(Measurement::new(
            meter_code,
            self.timestamp.unwrap_or(now),
            self.flow_value,
        ))
    }
}

// blank filter values mean "no filter"
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

#[derive(Deserialize)]
pub struct ReadingsQuery {
    #[serde(default, deserialize_with = "non_blank")]
    pub meter_code: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct CountQuery {
    #[serde(default, deserialize_with = "non_blank")]
    pub meter_code: Option<String>,
}

#[derive(Deserialize)]
pub struct AnomaliesQuery {
    #[serde(default, deserialize_with = "non_blank")]
    pub meter_code: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub method: Option<String>,
    pub window: Option<usize>,
    pub threshold: Option<f64>,
    // return every annotated point, not just the flagged ones
    #[serde(default)]
    pub all: bool,
}

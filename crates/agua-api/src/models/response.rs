use agua_anomaly::{AnnotatedResult, DetectionError, MeterSummary, WindowStats};
use agua_core::ProviderError;
use axum::{Json, http::StatusCode};
use serde::Serialize;

/// JSON error response
#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: u16,
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        (status, Json(Self {
            error: message.into(),
            code: status.as_u16(),
        }))
    }

    pub fn bad_request(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn from_provider(err: ProviderError) -> (StatusCode, Json<Self>) {
        match err {
            ProviderError::InvalidReading(_) => Self::bad_request(err.to_string()),
            ProviderError::Poisoned => Self::internal(err.to_string()),
        }
    }

    // every detection error is a caller input error
    pub fn from_detection(err: DetectionError) -> (StatusCode, Json<Self>) {
        Self::bad_request(err.to_string())
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Serialize)]
pub struct AnomaliesResponse {
    pub method: String,
    pub window: usize,
    pub threshold: f64,
    pub anomalies: Vec<AnomalyItem>,
    pub meters: Vec<MeterSummary>,
    pub checked_at: String,
}

/// One annotated reading, flattened for clients
#[derive(Serialize)]
pub struct AnomalyItem {
    pub meter_code: String,
    pub ts: String,
    pub flow_value: f64,
    pub is_anomaly: bool,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q1: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl From<AnnotatedResult> for AnomalyItem {
    fn from(r: AnnotatedResult) -> Self {
        let mut item = Self {
            ts: r.measurement.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            meter_code: r.measurement.meter_code,
            flow_value: r.measurement.flow_value,
            is_anomaly: r.is_anomaly,
            score: r.score,
            rolling_mean: None,
            rolling_std: None,
            q1: None,
            q3: None,
            lower_bound: None,
            upper_bound: None,
        };

        match r.stats {
            Some(WindowStats::ZScore {
                rolling_mean,
                rolling_std,
            }) => {
                item.rolling_mean = Some(rolling_mean);
                item.rolling_std = Some(rolling_std);
            }
            Some(WindowStats::Iqr {
                q1,
                q3,
                lower_bound,
                upper_bound,
            }) => {
                item.q1 = Some(q1);
                item.q3 = Some(q3);
                item.lower_bound = Some(lower_bound);
                item.upper_bound = Some(upper_bound);
            }
            None => {}
        }
        item
    }
}

mod anomalies;
mod readings;

pub use anomalies::*;
pub use readings::*;

use agua_core::TimeRange;
use axum::Json;
use chrono::{DateTime, Utc};

use crate::models::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// since/until query params -> optional range
pub fn time_range(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Option<TimeRange> {
    let range = TimeRange::new(since, until);
    (!range.is_unbounded()).then_some(range)
}

use agua_anomaly::{AnomalyDetector, DetectionConfig, Method, anomalies_only, summarize};
use agua_core::{ReadingQuery, ReadingsProvider};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::time_range;
use crate::models::{AnomaliesQuery, AnomaliesResponse, AnomalyItem, ApiError, ApiResult};
use crate::state::AppState;

// Handler: GET /analytics/anomalies
pub async fn get_anomalies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnomaliesQuery>,
) -> ApiResult<Json<AnomaliesResponse>> {
    let defaults = &state.config.detection;

    let method = match params.method.as_deref() {
        Some(name) => name.parse::<Method>().map_err(ApiError::from_detection)?,
        None => defaults.method,
    };

    let window = params.window.unwrap_or(defaults.window);
    if !(defaults.min_window..=defaults.max_window).contains(&window) {
        return Err(ApiError::bad_request(format!(
            "window must be between {} and {}, got {}",
            defaults.min_window, defaults.max_window, window
        )));
    }

    let threshold = params.threshold.unwrap_or_else(|| defaults.threshold_for(method));
    let allowed = defaults.threshold_range(method);
    if !allowed.contains(&threshold) {
        return Err(ApiError::bad_request(format!(
            "threshold for {} must be between {} and {}, got {}",
            method,
            allowed.start(),
            allowed.end(),
            threshold
        )));
    }

    let limit = state
        .config
        .readings
        .clamp_from(params.limit, defaults.limit, defaults.min_limit);
    let range = time_range(params.since, params.until);

    info!(
        meter_code = ?params.meter_code,
        %method,
        window,
        threshold,
        limit,
        "Anomalies request"
    );

    let mut config = DetectionConfig::new(method, window, threshold).with_limit(limit);
    if let Some(range) = range {
        config = config.with_time_range(range);
    }
    let detector = AnomalyDetector::new(config).map_err(ApiError::from_detection)?;

    let query = ReadingQuery {
        meter_code: params.meter_code,
        time_range: range,
        limit: Some(limit),
    };
    let readings = state
        .readings
        .fetch(&query)
        .map_err(ApiError::from_provider)?;

    let results = detector.detect(&readings).map_err(ApiError::from_detection)?;
    let meters = summarize(&results);

    let mut selected = if params.all {
        results
    } else {
        anomalies_only(results)
    };
    // newest first for clients
    selected.sort_by(|a, b| b.measurement.timestamp.cmp(&a.measurement.timestamp));

    let anomalies: Vec<AnomalyItem> = selected.into_iter().map(AnomalyItem::from).collect();

    info!(
        analysed = readings.len(),
        returned = anomalies.len(),
        meters = meters.len(),
        "Anomalies detected"
    );

    Ok(Json(AnomaliesResponse {
        method: method.to_string(),
        window,
        threshold,
        anomalies,
        meters,
        checked_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }))
}

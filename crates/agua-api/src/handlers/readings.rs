use agua_core::{Measurement, ReadingQuery, ReadingsProvider};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::time_range;
use crate::models::{ApiError, ApiResult, CountQuery, CountResponse, ReadingIn, ReadingsQuery};
use crate::state::AppState;

/// Ingest endpoint
// Handler: POST /readings
pub async fn create_reading(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReadingIn>,
) -> ApiResult<(StatusCode, Json<Measurement>)> {
    let reading = payload
        .into_measurement(Utc::now())
        .map_err(ApiError::bad_request)?;

    state
        .readings
        .insert(reading.clone())
        .map_err(ApiError::from_provider)?;

    info!(
        meter_code = %reading.meter_code,
        flow = reading.flow_value,
        ts = %reading.timestamp,
        "Reading stored"
    );

    Ok((StatusCode::CREATED, Json(reading)))
}

// Handler: GET /readings
pub async fn list_readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadingsQuery>,
) -> ApiResult<Json<Vec<Measurement>>> {
    let limits = &state.config.readings;
    let limit = limits.clamp(params.limit, limits.default_limit);
    info!(limit, meter_code = ?params.meter_code, "Readings request");

    let query = ReadingQuery {
        meter_code: params.meter_code,
        time_range: time_range(params.since, params.until),
        limit: Some(limit),
    };

    let readings = state
        .readings
        .fetch(&query)
        .map_err(ApiError::from_provider)?;

    Ok(Json(readings))
}

// Handler: GET /readings/count
pub async fn count_readings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CountQuery>,
) -> ApiResult<Json<CountResponse>> {
    let count = state
        .readings
        .count(params.meter_code.as_deref())
        .map_err(ApiError::from_provider)?;

    Ok(Json(CountResponse { count }))
}

//! HTTP service for meter readings and flow anomalies

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{count_readings, create_reading, get_anomalies, health, list_readings};
use crate::middleware::require_api_key;
use crate::state::AppState;

pub use config::ServiceConfig;

/// Build the router. `/health` stays open; everything else goes through the
/// API-key check.
pub fn app(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/readings", get(list_readings).post(create_reading))
        .route("/readings/count", get(count_readings))
        .route("/analytics/anomalies", get(get_anomalies))
        .layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

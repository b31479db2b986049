use agua_core::InMemoryReadings;

use crate::config::ServiceConfig;

// App state - shared across handlers
pub struct AppState {
    pub readings: InMemoryReadings,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_readings(config, InMemoryReadings::new())
    }

    pub fn with_readings(config: ServiceConfig, readings: InMemoryReadings) -> Self {
        Self { readings, config }
    }
}

use agua_api::{ServiceConfig, app, state::AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    //logging setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::from_env()?;
    info!(
        method = %config.detection.method,
        window = config.detection.window,
        "Configuration loaded"
    );

    // Log if API key is enabled
    if config.api_key().is_some() {
        info!("API key authentication ENABLED");
    } else {
        info!("API key authentication DISABLED (set AGUA_API_KEY to enable)");
    }

    let addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    // Server start
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

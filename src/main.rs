// Prediction Market Gateway - Main Entry Point
// Serves the simulated market-creation and amm contracts over HTTP

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use prediction_market_gateway::app_state::{AppState, SharedState};
use prediction_market_gateway::config::GatewayConfig;
use prediction_market_gateway::routes::router;
use prediction_market_gateway::rpc::CALL_PATH;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr;
    let state: SharedState = Arc::new(AppState::new(config));
    let shutdown_state = state.clone();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("📡 Listening on http://{}", addr);
    info!("   POST {}  - Execute a contract call", CALL_PATH);
    info!("   GET  /markets/:id          - Market record");
    info!("   GET  /pools/:id            - Liquidity pool");
    info!("   GET  /pools/:id/prices     - Implied option prices");
    info!("   GET  /activity             - Recent calls");

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C handler: {}", e);
            return;
        }

        info!("🛑 Shutdown signal received");
        if let Err(e) = shutdown_state.save_to_disk().await {
            error!("❌ Failed to save state: {}", e);
        }
    };

    if let Err(e) = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("❌ Server error: {}", e);
    }
}

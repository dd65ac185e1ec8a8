//! Allowance Sentinel API Server
//!
//! REST API over the approval risk engine and trust score composer
//!
//! Usage:
//!   cargo run --bin sentinel_api
//!
//! Environment:
//!   PORT / SENTINEL_PORT     - Server port (default: 8080)
//!   SENTINEL_HOST            - Server host (default: 0.0.0.0)
//!   SENTINEL_HIGH_VALUE_USD  - High-exposure threshold (default: 10000)
//!   SENTINEL_UNLIMITED_TOLERANCE - Distance below 2^256-1 still unlimited (default: 1)
//!   RUST_LOG                 - Log level (default: info)

use allowance_sentinel::api::{create_router, start_cleanup_task, AppState};
use allowance_sentinel::utils::constants::{APP_NAME, APP_VERSION};
use allowance_sentinel::{ApiConfig, EngineConfig, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let engine = EngineConfig::from_env()?;
    let api = ApiConfig::from_env()?;
    info!(
        high_value_usd = engine.approval.high_value_threshold_usd,
        tolerance = %engine.approval.unlimited_tolerance,
        "Engine configuration loaded"
    );

    let telemetry = Arc::new(TelemetryCollector::new());
    let state = Arc::new(AppState::new(engine, &api, telemetry.clone()));

    start_cleanup_task(state.rate_limiter.clone());

    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", api.host, api.port).parse()?;

    info!("{} v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  POST /v1/approvals/score  - Score approvals + summary stats");
    info!("  POST /v1/allowance/format - Format a raw allowance");
    info!("  POST /v1/trust/compose    - Trust score, grade and tone");
    info!("  POST /v1/time-ago         - Freshness label for a timestamp");
    info!("  POST /v1/scans            - Assemble a scan record");
    info!("  GET  /v1/stats            - Scoring statistics");
    info!("  GET  /v1/health           - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    let stats = telemetry.get_stats();
    info!("Shutdown signal received");
    info!("   Requests: {}", stats.requests);
    info!("   Approvals scored: {}", stats.approvals_scored);
    info!("   Trust scores composed: {}", stats.trust_scores_composed);

    Ok(())
}

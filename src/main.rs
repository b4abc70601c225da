//! OpenBook market data service
//!
//! Synchronizes order books and order statuses for the configured trading
//! pairs against the streaming provider, logs best prices periodically and
//! exposes health/metrics endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use tokio::time::interval;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use openbook_market_data::{Config, OrderDataManager, TracingNotifier, WsProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting OpenBook market data service");

    // Load configuration
    let config = Config::load()?;
    info!(pairs = ?config.trading_pairs, "Configuration loaded");

    let provider = Arc::new(WsProvider::new(
        &config.ws_endpoint,
        &config.rest_endpoint,
        &config.auth_header,
    ));
    let manager = Arc::new(OrderDataManager::new(
        provider,
        Arc::new(TracingNotifier),
        config.trading_pairs.clone(),
        config.owner_address.clone(),
        config.manager_settings(),
    ));

    // Start health check server
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_port).await {
            warn!(error = %e, "Health server error");
        }
    });

    manager.start().await?;
    manager.ready().await;

    // Periodic best-price status logging
    let status_manager = manager.clone();
    let pairs = config.trading_pairs.clone();
    let log_interval = Duration::from_secs(config.status_log_interval_secs);
    tokio::spawn(async move {
        let mut ticker = interval(log_interval);
        loop {
            ticker.tick().await;
            for pair in &pairs {
                let bid = status_manager.price_with_opportunity_size(pair, true).await;
                let ask = status_manager.price_with_opportunity_size(pair, false).await;
                if let (Ok((bid_price, bid_size)), Ok((ask_price, ask_size))) = (bid, ask) {
                    info!(
                        pair = %pair,
                        bid_price = %bid_price,
                        bid_size = %bid_size,
                        ask_price = %ask_price,
                        ask_size = %ask_size,
                        "Order book status"
                    );
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    manager.stop().await?;

    Ok(())
}

/// Start HTTP server for health checks and metrics
async fn start_health_server(port: u16) -> anyhow::Result<()> {
    use std::net::SocketAddr;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting health check server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "component": "openbook-market-data",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn metrics() -> String {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

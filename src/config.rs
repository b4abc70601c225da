//! Configuration module for the market data service

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::manager::ManagerSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Trading pairs to synchronize (e.g., ["SOL-USDC", "SOL-USDT"])
    pub trading_pairs: Vec<String>,

    /// WebSocket endpoint of the streaming provider
    pub ws_endpoint: String,

    /// REST endpoint for order book snapshots
    pub rest_endpoint: String,

    /// Provider authorization header value
    pub auth_header: String,

    /// Wallet address whose order statuses are streamed
    pub owner_address: String,

    /// Depth levels requested per snapshot and subscription
    pub snapshot_limit: u32,

    /// Snapshot attempts per pair before startup fails
    pub snapshot_attempts: u32,

    /// Warm-up delay before the manager advertises readiness, in seconds
    pub start_timeout_secs: u64,

    /// Interval of the best-price status log, in seconds
    pub status_log_interval_secs: u64,

    /// Port of the health/metrics HTTP server
    pub health_port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let trading_pairs: Vec<String> = env::var("TRADING_PAIRS")
            .unwrap_or_else(|_| "SOL-USDC".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        Ok(Self {
            trading_pairs,
            ws_endpoint: env::var("WS_ENDPOINT")
                .unwrap_or_else(|_| "wss://virginia.solana.dex.blxrbdn.com/ws".to_string()),
            rest_endpoint: env::var("REST_ENDPOINT")
                .unwrap_or_else(|_| "https://virginia.solana.dex.blxrbdn.com/api/v2".to_string()),
            auth_header: env::var("AUTH_HEADER").unwrap_or_default(),
            owner_address: env::var("OWNER_ADDRESS").unwrap_or_default(),
            snapshot_limit: env::var("SNAPSHOT_LIMIT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            snapshot_attempts: env::var("SNAPSHOT_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            start_timeout_secs: env::var("START_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            status_log_interval_secs: env::var("STATUS_LOG_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            health_port: env::var("HEALTH_PORT")
                .unwrap_or_else(|_| "9090".to_string())
                .parse()
                .unwrap_or(9090),
        })
    }

    /// Startup tunables for the synchronization manager
    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings {
            snapshot_limit: self.snapshot_limit,
            snapshot_attempts: self.snapshot_attempts,
            start_timeout: Duration::from_secs(self.start_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trading_pairs: vec!["SOL-USDC".to_string()],
            ws_endpoint: "wss://virginia.solana.dex.blxrbdn.com/ws".to_string(),
            rest_endpoint: "https://virginia.solana.dex.blxrbdn.com/api/v2".to_string(),
            auth_header: String::new(),
            owner_address: String::new(),
            snapshot_limit: 5,
            snapshot_attempts: 5,
            start_timeout_secs: 10,
            status_log_interval_secs: 30,
            health_port: 9090,
        }
    }
}

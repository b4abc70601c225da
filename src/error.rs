//! Error types for the market data service

use thiserror::Error;

/// Market data service errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("order book for {pair} could not be initialized")]
    OrderbookInitialization { pair: String },

    #[error("unsupported trading pair: {0}")]
    UnsupportedPair(String),

    #[error("unknown trading pair: {0}")]
    UnknownPair(String),

    #[error("WebSocket connection error: {0}")]
    WebSocketConnection(String),

    #[error("WebSocket message error: {0}")]
    WebSocketMessage(String),

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("failed to parse message: {0}")]
    Parse(String),

    #[error("REST API error: {0}")]
    RestApi(String),

    #[error("provider not connected")]
    NotConnected,
}

impl From<tokio_tungstenite::tungstenite::Error> for MarketDataError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        MarketDataError::WebSocketConnection(err.to_string())
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        MarketDataError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        MarketDataError::RestApi(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketDataError>;

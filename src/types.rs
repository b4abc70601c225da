//! Domain types shared between the order book store, the order status
//! ledger and the provider boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Bid,
    Ask,
    Unknown,
}

impl From<String> for Side {
    fn from(value: String) -> Self {
        match value.as_str() {
            "BID" | "S_BID" => Side::Bid,
            "ASK" | "S_ASK" => Side::Ask,
            _ => Side::Unknown,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "BID"),
            Side::Ask => write!(f, "ASK"),
            Side::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Lifecycle state of an order as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Open,
    PartiallyFilled,
    Filled,
    Canceled,
    Failed,
    Unknown,
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING" | "OS_PENDING_NEW" => OrderStatus::Pending,
            "OPEN" | "OS_OPEN" => OrderStatus::Open,
            "PARTIALLY_FILLED" | "OS_PARTIAL_FILL" => OrderStatus::PartiallyFilled,
            "FILLED" | "OS_FILLED" => OrderStatus::Filled,
            "CANCELED" | "OS_CANCELLED" => OrderStatus::Canceled,
            "FAILED" | "OS_FAILED" => OrderStatus::Failed,
            _ => OrderStatus::Unknown,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Open => "OPEN",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}

/// A single resting level in the order book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// Point-in-time full view of the resting levels for one market.
///
/// Delivery order of `bids`/`asks` is not guaranteed by the provider; best
/// prices are always derived by extremum, never by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub market: String,
    #[serde(default)]
    pub bids: Vec<OrderBookLevel>,
    #[serde(default)]
    pub asks: Vec<OrderBookLevel>,
}

/// One order status transition observed on the stream.
///
/// Quantities are raw wire values: for `Side::Bid` orders they are
/// quote-currency notional, converted to base units only when a
/// notification message is formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusEvent {
    pub order_status: OrderStatus,
    pub quantity_released: Decimal,
    pub quantity_remaining: Decimal,
    pub side: Side,
    pub fill_price: Decimal,
    pub order_price: Decimal,
    pub client_order_id: u64,
    pub observed_at: DateTime<Utc>,
}

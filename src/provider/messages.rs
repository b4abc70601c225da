//! Wire messages for the provider's JSON-RPC API
//!
//! Typed payloads validated at the client boundary; the rest of the crate
//! only sees domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{OrderStatus, OrderStatusEvent, OrderbookSnapshot, Side};

use rust_decimal::Decimal;

/// Outgoing JSON-RPC request
#[derive(Debug, Serialize)]
pub struct WsRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> WsRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Incoming frame: either a response to a request (`id` set) or a
/// subscription notification (`method`/`params` set)
#[derive(Debug, Deserialize)]
pub struct WsMessage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<WsErrorBody>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<SubscriptionParams>,
}

#[derive(Debug, Deserialize)]
pub struct WsErrorBody {
    pub code: i64,
    pub message: String,
}

/// Payload of a subscription notification
#[derive(Debug, Deserialize)]
pub struct SubscriptionParams {
    pub subscription: String,
    pub result: Value,
}

/// One delivery on the order book stream
#[derive(Debug, Deserialize)]
pub struct OrderbookStreamUpdate {
    #[serde(default)]
    pub slot: u64,
    pub orderbook: OrderbookSnapshot,
}

/// One delivery on an order status stream
#[derive(Debug, Deserialize)]
pub struct OrderStatusStreamUpdate {
    #[serde(default)]
    pub slot: u64,
    #[serde(rename = "orderInfo")]
    pub order_info: OrderStatusMsg,
}

/// Raw order status payload as carried on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusMsg {
    pub market: String,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub quantity_released: Decimal,
    #[serde(default)]
    pub quantity_remaining: Decimal,
    pub side: Side,
    #[serde(default)]
    pub fill_price: Decimal,
    #[serde(default)]
    pub order_price: Decimal,
    #[serde(rename = "clientOrderID")]
    pub client_order_id: u64,
}

impl OrderStatusMsg {
    /// Split into the market identifier and a domain event stamped with
    /// the arrival time
    pub fn into_event(self, observed_at: DateTime<Utc>) -> (String, OrderStatusEvent) {
        (
            self.market,
            OrderStatusEvent {
                order_status: self.order_status,
                quantity_released: self.quantity_released,
                quantity_remaining: self.quantity_remaining,
                side: self.side,
                fill_price: self.fill_price,
                order_price: self.order_price,
                client_order_id: self.client_order_id,
                observed_at,
            },
        )
    }
}

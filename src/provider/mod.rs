//! Provider client boundary
//!
//! The synchronization manager talks to the streaming provider through the
//! [`Provider`] trait; [`WsProvider`] is the production implementation.

mod messages;
mod ws;

pub use messages::{OrderStatusMsg, OrderStatusStreamUpdate, OrderbookStreamUpdate};
pub use ws::WsProvider;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::types::{OrderStatusEvent, OrderbookSnapshot};

/// Project identifier sent with every order book and order status request
pub const OPENBOOK_PROJECT: &str = "P_OPENBOOK";

/// An order status event together with the market it belongs to
#[derive(Debug, Clone)]
pub struct OrderStatusUpdate {
    pub market: String,
    pub event: OrderStatusEvent,
}

pub type OrderbookStream = BoxStream<'static, Result<OrderbookSnapshot>>;
pub type OrderStatusStream = BoxStream<'static, Result<OrderStatusUpdate>>;

/// Streaming provider client.
///
/// One connection is shared by every listener; `connect` while already
/// connected is a no-op so each listener can re-enter it safely.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn connect(&self) -> Result<()>;

    /// Fetch a point-in-time snapshot for one market
    async fn get_orderbook(&self, market: &str, limit: u32) -> Result<OrderbookSnapshot>;

    /// Subscribe to order book updates for a set of markets
    async fn orderbook_stream(&self, markets: &[String], limit: u32) -> Result<OrderbookStream>;

    /// Subscribe to order status events for one market and owner
    async fn order_status_stream(&self, market: &str, owner_address: &str)
        -> Result<OrderStatusStream>;

    async fn close(&self) -> Result<()>;
}

//! OpenBook market data synchronization
//!
//! This crate keeps an in-memory best-bid/best-ask view and per-order
//! status histories for a set of OpenBook trading pairs, fed by a
//! streaming provider: one snapshot per pair at startup, then continuous
//! order book and order status streams applied in the background while
//! callers query a consistent read view.

pub mod config;
pub mod error;
pub mod ledger;
pub mod manager;
pub mod notify;
pub mod orderbook;
pub mod pair;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{MarketDataError, Result};
pub use ledger::OrderStatusLedger;
pub use manager::{ManagerSettings, ManagerState, OrderDataManager};
pub use notify::{NotificationSink, TracingNotifier};
pub use orderbook::{OrderBookStore, OrderbookInfo};
pub use pair::normalize_pair;
pub use provider::{Provider, WsProvider};
pub use types::{OrderBookLevel, OrderStatus, OrderStatusEvent, OrderbookSnapshot, Side};

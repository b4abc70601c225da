//! Order status ledger
//!
//! Append-only history of order status events per pair and client order
//! id, with idempotent de-duplication of redelivered events.

use std::collections::HashMap;

use crate::error::{MarketDataError, Result};
use crate::pair::normalize_pair;
use crate::types::OrderStatusEvent;

type OrderHistories = HashMap<u64, Vec<OrderStatusEvent>>;

/// Per-pair order status histories, keyed by canonical pair
#[derive(Debug, Default)]
pub struct OrderStatusLedger {
    markets: HashMap<String, OrderHistories>,
}

impl OrderStatusLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pair; only registered pairs accept events
    pub fn register(&mut self, trading_pair: &str) {
        self.markets.entry(normalize_pair(trading_pair)).or_default();
    }

    /// Append an event to the history for its `(pair, client_order_id)`.
    ///
    /// An event matching the latest stored entry in both status and
    /// remaining quantity is a redelivery and is dropped. Returns whether
    /// an append occurred; the caller uses this to drive notifications.
    ///
    /// Only the latest entry is examined, so a stale state redelivered
    /// after a newer one is appended again; the stream is assumed to
    /// deliver in order.
    pub fn apply(&mut self, market: &str, event: OrderStatusEvent) -> Result<bool> {
        let pair = normalize_pair(market);
        let orders = self
            .markets
            .get_mut(&pair)
            .ok_or(MarketDataError::UnsupportedPair(pair.clone()))?;

        let history = orders.entry(event.client_order_id).or_default();
        if let Some(latest) = history.last() {
            if latest.order_status == event.order_status
                && latest.quantity_remaining == event.quantity_remaining
            {
                return Ok(false);
            }
        }

        history.push(event);
        Ok(true)
    }

    /// Event history for an order, in arrival order.
    ///
    /// An unknown order id yields an empty history; only an unregistered
    /// pair is an error.
    pub fn history(&self, trading_pair: &str, client_order_id: u64) -> Result<Vec<OrderStatusEvent>> {
        let pair = normalize_pair(trading_pair);
        let orders = self
            .markets
            .get(&pair)
            .ok_or(MarketDataError::UnsupportedPair(pair.clone()))?;

        Ok(orders.get(&client_order_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, Side};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn event(status: OrderStatus, remaining: rust_decimal::Decimal, id: u64) -> OrderStatusEvent {
        OrderStatusEvent {
            order_status: status,
            quantity_released: dec!(0),
            quantity_remaining: remaining,
            side: Side::Ask,
            fill_price: dec!(0),
            order_price: dec!(10),
            client_order_id: id,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_event_always_appends() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOL-USDC");

        let appended = ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap();
        assert!(appended);
        assert_eq!(ledger.history("SOLUSDC", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_event_is_dropped() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOLUSDC");

        assert!(ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap());
        assert!(!ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap());
        assert_eq!(ledger.history("SOLUSDC", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_status_or_remaining_change_appends() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOLUSDC");

        ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap();
        assert!(ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(3), 1))
            .unwrap());
        assert!(ledger
            .apply("SOLUSDC", event(OrderStatus::Filled, dec!(3), 1))
            .unwrap());

        let history = ledger.history("SOLUSDC", 1).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].order_status, OrderStatus::Open);
        assert_eq!(history[1].quantity_remaining, dec!(3));
        assert_eq!(history[2].order_status, OrderStatus::Filled);
    }

    #[test]
    fn test_histories_are_per_order_id() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOLUSDC");

        ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap();
        ledger
            .apply("SOLUSDC", event(OrderStatus::Open, dec!(5), 2))
            .unwrap();

        assert_eq!(ledger.history("SOLUSDC", 1).unwrap().len(), 1);
        assert_eq!(ledger.history("SOLUSDC", 2).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_order_id_yields_empty_history() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOLUSDC");
        assert!(ledger.history("SOLUSDC", 42).unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_pair_is_rejected() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOLUSDC");

        assert!(matches!(
            ledger.apply("BTCUSDT", event(OrderStatus::Open, dec!(5), 1)),
            Err(MarketDataError::UnsupportedPair(_))
        ));
        assert!(matches!(
            ledger.history("BTCUSDT", 1),
            Err(MarketDataError::UnsupportedPair(_))
        ));
    }

    #[test]
    fn test_market_is_normalized_on_apply() {
        let mut ledger = OrderStatusLedger::new();
        ledger.register("SOL-USDC");

        assert!(ledger
            .apply("SOL/USDC", event(OrderStatus::Open, dec!(5), 1))
            .unwrap());
        assert_eq!(ledger.history("solusdc", 1).unwrap().len(), 1);
    }
}

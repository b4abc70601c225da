//! Order book store
//!
//! Holds the latest snapshot per trading pair together with the derived
//! best bid/ask, replaced wholesale on every update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{MarketDataError, Result};
use crate::pair::normalize_pair;
use crate::types::{OrderBookLevel, OrderbookSnapshot};

/// Latest order book view for a single pair.
///
/// Best prices are recomputed when the snapshot is applied, so a reader
/// always sees a snapshot and its derived prices from the same update.
#[derive(Debug, Clone)]
pub struct OrderbookInfo {
    pub best_ask_price: Decimal,
    pub best_ask_size: Decimal,
    pub best_bid_price: Decimal,
    pub best_bid_size: Decimal,
    pub snapshot: OrderbookSnapshot,
    pub observed_at: DateTime<Utc>,
}

/// Order book views for all tracked pairs, keyed by canonical pair
#[derive(Debug, Default)]
pub struct OrderBookStore {
    books: HashMap<String, OrderbookInfo>,
}

impl OrderBookStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored view for the snapshot's market.
    ///
    /// Best ask is the minimum-priced ask level and best bid the
    /// maximum-priced bid level; the provider does not guarantee sorted
    /// delivery. An empty side yields `(0, 0)`.
    pub fn apply(&mut self, snapshot: OrderbookSnapshot) {
        let pair = normalize_pair(&snapshot.market);

        let (best_ask_price, best_ask_size) = best_level(&snapshot.asks, Extreme::Min);
        let (best_bid_price, best_bid_size) = best_level(&snapshot.bids, Extreme::Max);

        self.books.insert(
            pair,
            OrderbookInfo {
                best_ask_price,
                best_ask_size,
                best_bid_price,
                best_bid_size,
                snapshot,
                observed_at: Utc::now(),
            },
        );
    }

    /// Get the current view for a pair
    pub fn get(&self, trading_pair: &str) -> Result<&OrderbookInfo> {
        let pair = normalize_pair(trading_pair);
        self.books
            .get(&pair)
            .ok_or(MarketDataError::UnknownPair(pair))
    }

    /// Best price and opportunity size: best bid when `is_buy`, else best ask
    pub fn best_price(&self, trading_pair: &str, is_buy: bool) -> Result<(Decimal, Decimal)> {
        let info = self.get(trading_pair)?;
        Ok(if is_buy {
            (info.best_bid_price, info.best_bid_size)
        } else {
            (info.best_ask_price, info.best_ask_size)
        })
    }

    /// Whether a pair has ever received a snapshot
    pub fn contains(&self, trading_pair: &str) -> bool {
        self.books.contains_key(&normalize_pair(trading_pair))
    }
}

enum Extreme {
    Min,
    Max,
}

fn best_level(levels: &[OrderBookLevel], extreme: Extreme) -> (Decimal, Decimal) {
    let best = match extreme {
        Extreme::Min => levels.iter().min_by_key(|level| level.price),
        Extreme::Max => levels.iter().max_by_key(|level| level.price),
    };
    best.map(|level| (level.price, level.size))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(market: &str, bids: &[(i64, i64)], asks: &[(i64, i64)]) -> OrderbookSnapshot {
        let levels = |items: &[(i64, i64)]| {
            items
                .iter()
                .map(|(price, size)| OrderBookLevel {
                    price: Decimal::from(*price),
                    size: Decimal::from(*size),
                })
                .collect()
        };
        OrderbookSnapshot {
            market: market.to_string(),
            bids: levels(bids),
            asks: levels(asks),
        }
    }

    #[test]
    fn test_best_prices_by_extremum() {
        let mut store = OrderBookStore::new();
        store.apply(snapshot("SOLUSDC", &[(5, 2), (6, 7)], &[(3, 4), (4, 4)]));

        assert_eq!(
            store.best_price("SOL-USDC", true).unwrap(),
            (dec!(6), dec!(7))
        );
        assert_eq!(
            store.best_price("SOL-USDC", false).unwrap(),
            (dec!(3), dec!(4))
        );
    }

    #[test]
    fn test_best_prices_independent_of_delivery_order() {
        let mut store = OrderBookStore::new();
        // Bids descending, asks descending: position-based picks would be wrong
        store.apply(snapshot("SOLUSDC", &[(6, 7), (5, 2)], &[(4, 4), (3, 4)]));

        assert_eq!(
            store.best_price("SOLUSDC", true).unwrap(),
            (dec!(6), dec!(7))
        );
        assert_eq!(
            store.best_price("SOLUSDC", false).unwrap(),
            (dec!(3), dec!(4))
        );
    }

    #[test]
    fn test_empty_side_defaults_to_zero() {
        let mut store = OrderBookStore::new();
        store.apply(snapshot("SOLUSDC", &[(5, 2)], &[]));

        assert_eq!(
            store.best_price("SOLUSDC", false).unwrap(),
            (dec!(0), dec!(0))
        );
        assert_eq!(
            store.best_price("SOLUSDC", true).unwrap(),
            (dec!(5), dec!(2))
        );
    }

    #[test]
    fn test_update_replaces_snapshot_wholesale() {
        let mut store = OrderBookStore::new();
        store.apply(snapshot("SOLUSDC", &[(5, 2), (6, 7)], &[(3, 4), (4, 4)]));
        store.apply(snapshot("SOLUSDC", &[(10, 2), (12, 7)], &[(2, 3), (3, 4)]));

        let info = store.get("SOLUSDC").unwrap();
        assert_eq!((info.best_bid_price, info.best_bid_size), (dec!(12), dec!(7)));
        assert_eq!((info.best_ask_price, info.best_ask_size), (dec!(2), dec!(3)));
        assert_eq!(info.snapshot.bids.len(), 2);
    }

    #[test]
    fn test_unknown_pair() {
        let store = OrderBookStore::new();
        assert!(matches!(
            store.get("SOLUSDC"),
            Err(MarketDataError::UnknownPair(_))
        ));
        assert!(matches!(
            store.best_price("SOLUSDC", true),
            Err(MarketDataError::UnknownPair(_))
        ));
    }

    #[test]
    fn test_market_key_is_normalized() {
        let mut store = OrderBookStore::new();
        store.apply(snapshot("SOL/USDC", &[(5, 2)], &[(6, 1)]));
        assert!(store.contains("sol-usdc"));
        assert!(store.get("SOLUSDC").is_ok());
    }
}

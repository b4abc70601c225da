//! Benchmarks for order book store operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use openbook_market_data::orderbook::OrderBookStore;
use openbook_market_data::types::{OrderBookLevel, OrderbookSnapshot};
use rust_decimal::Decimal;
use std::str::FromStr;

fn create_snapshot(levels: usize) -> OrderbookSnapshot {
    let bids: Vec<OrderBookLevel> = (0..levels)
        .map(|i| OrderBookLevel {
            price: Decimal::from(200 - i as i64),
            size: Decimal::from_str("1.5").unwrap(),
        })
        .collect();

    let asks: Vec<OrderBookLevel> = (0..levels)
        .map(|i| OrderBookLevel {
            price: Decimal::from(201 + i as i64),
            size: Decimal::from_str("1.5").unwrap(),
        })
        .collect();

    OrderbookSnapshot {
        market: "SOLUSDC".to_string(),
        bids,
        asks,
    }
}

fn benchmark_apply_snapshot(c: &mut Criterion) {
    let snapshot = create_snapshot(100);

    c.bench_function("apply_snapshot_100_levels", |b| {
        b.iter(|| {
            let mut store = OrderBookStore::new();
            store.apply(black_box(snapshot.clone()));
        })
    });
}

fn benchmark_best_price(c: &mut Criterion) {
    let mut store = OrderBookStore::new();
    store.apply(create_snapshot(100));

    c.bench_function("best_price", |b| {
        b.iter(|| {
            black_box(store.best_price("SOLUSDC", true).unwrap());
        })
    });
}

criterion_group!(benches, benchmark_apply_snapshot, benchmark_best_price);
criterion_main!(benches);

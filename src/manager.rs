//! Order data synchronization manager
//!
//! Owns the order book store and order status ledger, fetches the initial
//! snapshots, runs the background stream listeners and serves queries.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use rust_decimal::Decimal;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::{MarketDataError, Result};
use crate::ledger::OrderStatusLedger;
use crate::notify::{format_order_status, NotificationSink};
use crate::orderbook::OrderBookStore;
use crate::pair::normalize_pair;
use crate::provider::Provider;
use crate::types::{OrderStatusEvent, OrderbookSnapshot};
use chrono::{DateTime, Utc};

/// Manager lifecycle; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Created,
    Starting,
    Ready,
    Stopped,
}

/// Tunables for startup behavior
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// Depth levels requested per snapshot and stream subscription
    pub snapshot_limit: u32,
    /// Attempts per pair before startup is abandoned
    pub snapshot_attempts: u32,
    /// Grace period between spawning the listeners and advertising
    /// readiness, letting the fresh streams deliver their first events
    pub start_timeout: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            snapshot_limit: 5,
            snapshot_attempts: 5,
            start_timeout: Duration::from_secs(10),
        }
    }
}

/// Synchronizes order books and order statuses for a set of trading pairs
pub struct OrderDataManager {
    provider: Arc<dyn Provider>,
    sink: Arc<dyn NotificationSink>,
    trading_pairs: Vec<String>,
    owner_address: String,
    settings: ManagerSettings,
    books: Arc<RwLock<OrderBookStore>>,
    ledger: Arc<RwLock<OrderStatusLedger>>,
    state: watch::Sender<ManagerState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl OrderDataManager {
    pub fn new(
        provider: Arc<dyn Provider>,
        sink: Arc<dyn NotificationSink>,
        trading_pairs: Vec<String>,
        owner_address: impl Into<String>,
        settings: ManagerSettings,
    ) -> Self {
        let trading_pairs = trading_pairs.iter().map(|p| normalize_pair(p)).collect();
        let (state, _) = watch::channel(ManagerState::Created);

        Self {
            provider,
            sink,
            trading_pairs,
            owner_address: owner_address.into(),
            settings,
            books: Arc::new(RwLock::new(OrderBookStore::new())),
            ledger: Arc::new(RwLock::new(OrderStatusLedger::new())),
            state,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ManagerState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ManagerState::Ready
    }

    /// Suspend until the manager reaches `Ready`. Broadcast: every waiter
    /// is released by the same transition.
    pub async fn ready(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == ManagerState::Ready).await;
    }

    /// Connect, initialize every order book, spawn the stream listeners
    /// and advertise readiness after the configured warm-up delay.
    ///
    /// Only acts from `Created`; any later call is a no-op. Exhausting the
    /// snapshot retries for any pair aborts startup with
    /// [`MarketDataError::OrderbookInitialization`] and no listener keeps
    /// running for a partially initialized set.
    pub async fn start(&self) -> Result<()> {
        if self.state() != ManagerState::Created {
            debug!(state = ?self.state(), "start called again, ignoring");
            return Ok(());
        }
        self.state.send_replace(ManagerState::Starting);

        self.provider.connect().await?;
        self.initialize_order_books().await?;

        let mut tasks = self.tasks.lock().await;
        tasks.push(tokio::spawn(run_orderbook_listener(
            self.provider.clone(),
            self.books.clone(),
            self.trading_pairs.clone(),
            self.settings.snapshot_limit,
        )));

        {
            let mut ledger = self.ledger.write().await;
            for pair in &self.trading_pairs {
                ledger.register(pair);
            }
        }
        for pair in &self.trading_pairs {
            tasks.push(tokio::spawn(run_order_status_listener(
                self.provider.clone(),
                self.ledger.clone(),
                self.sink.clone(),
                pair.clone(),
                self.owner_address.clone(),
            )));
        }
        drop(tasks);

        sleep(self.settings.start_timeout).await;
        self.state.send_replace(ManagerState::Ready);
        info!(pairs = ?self.trading_pairs, "order data manager ready");
        Ok(())
    }

    /// Close the provider connection and cancel every listener. Idempotent;
    /// the listeners' suspension points are their stream pulls, so no
    /// half-applied update is left behind.
    pub async fn stop(&self) -> Result<()> {
        if self.state() == ManagerState::Stopped {
            return Ok(());
        }

        self.provider.close().await?;
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
        self.state.send_replace(ManagerState::Stopped);
        info!("order data manager stopped");
        Ok(())
    }

    /// Latest snapshot for a pair with its observation time
    pub async fn order_book(
        &self,
        trading_pair: &str,
    ) -> Result<(OrderbookSnapshot, DateTime<Utc>)> {
        let pair = self.supported_pair(trading_pair)?;
        let books = self.books.read().await;
        let info = books.get(&pair)?;
        Ok((info.snapshot.clone(), info.observed_at))
    }

    /// Best bid (when `is_buy`) or best ask with its opportunity size
    pub async fn price_with_opportunity_size(
        &self,
        trading_pair: &str,
        is_buy: bool,
    ) -> Result<(Decimal, Decimal)> {
        let pair = self.supported_pair(trading_pair)?;
        self.books.read().await.best_price(&pair, is_buy)
    }

    /// Status event history for one order; empty for unknown ids
    pub async fn order_status(
        &self,
        trading_pair: &str,
        client_order_id: u64,
    ) -> Result<Vec<OrderStatusEvent>> {
        let pair = self.supported_pair(trading_pair)?;
        self.ledger.read().await.history(&pair, client_order_id)
    }

    fn supported_pair(&self, trading_pair: &str) -> Result<String> {
        let pair = normalize_pair(trading_pair);
        if self.trading_pairs.contains(&pair) {
            Ok(pair)
        } else {
            Err(MarketDataError::UnsupportedPair(trading_pair.to_string()))
        }
    }

    async fn initialize_order_books(&self) -> Result<()> {
        for pair in &self.trading_pairs {
            let mut initialized = false;
            for attempt in 1..=self.settings.snapshot_attempts {
                let snapshot = self
                    .provider
                    .get_orderbook(pair, self.settings.snapshot_limit)
                    .await?;
                if snapshot.market.is_empty() {
                    debug!(pair = %pair, attempt, "snapshot missing market field, retrying");
                    continue;
                }

                self.books.write().await.apply(snapshot);
                initialized = true;
                break;
            }

            if !initialized {
                return Err(MarketDataError::OrderbookInitialization { pair: pair.clone() });
            }
        }
        Ok(())
    }
}

/// Shared listener applying order book updates for every pair.
///
/// A stream error or end of stream terminates the listener; the manager
/// stays ready and the stored books simply stop refreshing.
async fn run_orderbook_listener(
    provider: Arc<dyn Provider>,
    books: Arc<RwLock<OrderBookStore>>,
    trading_pairs: Vec<String>,
    limit: u32,
) {
    match poll_order_book_updates(provider, books, trading_pairs, limit).await {
        Ok(()) => warn!("order book stream ended"),
        Err(e) => error!(error = %e, "order book listener terminated"),
    }
}

async fn poll_order_book_updates(
    provider: Arc<dyn Provider>,
    books: Arc<RwLock<OrderBookStore>>,
    trading_pairs: Vec<String>,
    limit: u32,
) -> Result<()> {
    provider.connect().await?;
    let mut stream = provider.orderbook_stream(&trading_pairs, limit).await?;

    while let Some(update) = stream.next().await {
        let snapshot = update?;
        books.write().await.apply(snapshot);
    }
    Ok(())
}

/// Per-pair listener applying order status events and emitting one
/// notification per genuine change
async fn run_order_status_listener(
    provider: Arc<dyn Provider>,
    ledger: Arc<RwLock<OrderStatusLedger>>,
    sink: Arc<dyn NotificationSink>,
    trading_pair: String,
    owner_address: String,
) {
    match poll_order_status_updates(provider, ledger, sink, &trading_pair, &owner_address).await {
        Ok(()) => warn!(pair = %trading_pair, "order status stream ended"),
        Err(e) => error!(pair = %trading_pair, error = %e, "order status listener terminated"),
    }
}

async fn poll_order_status_updates(
    provider: Arc<dyn Provider>,
    ledger: Arc<RwLock<OrderStatusLedger>>,
    sink: Arc<dyn NotificationSink>,
    trading_pair: &str,
    owner_address: &str,
) -> Result<()> {
    provider.connect().await?;
    let mut stream = provider
        .order_status_stream(trading_pair, owner_address)
        .await?;

    while let Some(update) = stream.next().await {
        let update = update?;
        let appended = ledger
            .write()
            .await
            .apply(&update.market, update.event.clone())?;
        if appended {
            sink.notify(&format_order_status(&update.event));
        }
    }
    Ok(())
}

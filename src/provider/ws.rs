//! WebSocket-backed provider client
//!
//! Snapshots are fetched over the provider's REST API; streams are
//! JSON-RPC subscriptions multiplexed over a single WebSocket connection.
//! A background task owns the socket, routes responses to their callers
//! and fans subscription notifications out to per-subscription channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use futures_util::SinkExt;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::messages::{OrderStatusStreamUpdate, OrderbookStreamUpdate, WsMessage, WsRequest};
use super::{
    OrderStatusStream, OrderStatusUpdate, OrderbookStream, Provider, OPENBOOK_PROJECT,
};
use crate::error::{MarketDataError, Result};
use crate::types::OrderbookSnapshot;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum Command {
    Request {
        id: u64,
        text: String,
        reply: oneshot::Sender<Result<Value>>,
        subscribe: Option<mpsc::UnboundedSender<Value>>,
    },
    Close,
}

struct WsHandle {
    commands: mpsc::UnboundedSender<Command>,
}

/// Provider client over the public trader API
pub struct WsProvider {
    ws_endpoint: String,
    rest_endpoint: String,
    auth_header: String,
    http: reqwest::Client,
    handle: Mutex<Option<WsHandle>>,
    next_request_id: AtomicU64,
}

impl WsProvider {
    pub fn new(ws_endpoint: &str, rest_endpoint: &str, auth_header: &str) -> Self {
        Self {
            ws_endpoint: ws_endpoint.to_string(),
            rest_endpoint: rest_endpoint.trim_end_matches('/').to_string(),
            auth_header: auth_header.to_string(),
            http: reqwest::Client::new(),
            handle: Mutex::new(None),
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Issue a request and await its response. When `subscribe` is given,
    /// the returned subscription id is bound to that channel inside the
    /// connection task, so no notification can slip through before the
    /// registration lands.
    async fn request(
        &self,
        method: &str,
        params: Value,
        subscribe: Option<mpsc::UnboundedSender<Value>>,
    ) -> Result<Value> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let text = serde_json::to_string(&WsRequest::new(id, method, params))?;
        let (reply_tx, reply_rx) = oneshot::channel();

        {
            let guard = self.handle.lock().await;
            let handle = guard.as_ref().ok_or(MarketDataError::NotConnected)?;
            handle
                .commands
                .send(Command::Request {
                    id,
                    text,
                    reply: reply_tx,
                    subscribe,
                })
                .map_err(|_| {
                    MarketDataError::WebSocketConnection("connection task has exited".to_string())
                })?;
        }

        reply_rx.await.map_err(|_| {
            MarketDataError::WebSocketConnection("connection task has exited".to_string())
        })?
    }

    async fn subscribe(&self, stream_name: &str, params: Value) -> Result<mpsc::UnboundedReceiver<Value>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let result = self
            .request("subscribe", json!([stream_name, params]), Some(tx))
            .await?;

        match result {
            Value::String(subscription) => {
                debug!(stream = stream_name, subscription = %subscription, "subscription established");
                Ok(rx)
            }
            other => Err(MarketDataError::Subscription(format!(
                "subscribe to {stream_name} did not return a subscription id: {other}"
            ))),
        }
    }
}

#[async_trait]
impl Provider for WsProvider {
    async fn connect(&self) -> Result<()> {
        let mut guard = self.handle.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let mut request = self.ws_endpoint.as_str().into_client_request()?;
        if !self.auth_header.is_empty() {
            let value = HeaderValue::from_str(&self.auth_header)
                .map_err(|e| MarketDataError::WebSocketConnection(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, response) = connect_async(request).await?;
        info!(status = ?response.status(), "WebSocket connected");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_connection(stream, command_rx));
        *guard = Some(WsHandle {
            commands: command_tx,
        });

        Ok(())
    }

    async fn get_orderbook(&self, market: &str, limit: u32) -> Result<OrderbookSnapshot> {
        let url = format!("{}/market/orderbooks/{}", self.rest_endpoint, market);
        let mut request = self.http.get(&url).query(&[
            ("limit", limit.to_string()),
            ("project", OPENBOOK_PROJECT.to_string()),
        ]);
        if !self.auth_header.is_empty() {
            // reqwest pins an older `http` than tungstenite; use its own name
            request = request.header(reqwest::header::AUTHORIZATION, self.auth_header.as_str());
        }

        let snapshot = request
            .send()
            .await?
            .error_for_status()?
            .json::<OrderbookSnapshot>()
            .await?;
        Ok(snapshot)
    }

    async fn orderbook_stream(&self, markets: &[String], limit: u32) -> Result<OrderbookStream> {
        let rx = self
            .subscribe(
                "GetOrderbooksStream",
                json!({
                    "markets": markets,
                    "limit": limit,
                    "project": OPENBOOK_PROJECT,
                }),
            )
            .await?;

        let stream = stream::unfold(rx, |mut rx| async move {
            let value = rx.recv().await?;
            Some((parse_orderbook_update(value), rx))
        });
        Ok(stream.boxed())
    }

    async fn order_status_stream(
        &self,
        market: &str,
        owner_address: &str,
    ) -> Result<OrderStatusStream> {
        let rx = self
            .subscribe(
                "GetOrderStatusStream",
                json!({
                    "market": market,
                    "ownerAddress": owner_address,
                    "project": OPENBOOK_PROJECT,
                }),
            )
            .await?;

        let stream = stream::unfold(rx, |mut rx| async move {
            let value = rx.recv().await?;
            Some((parse_order_status_update(value), rx))
        });
        Ok(stream.boxed())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.handle.lock().await;
        if let Some(handle) = guard.take() {
            let _ = handle.commands.send(Command::Close);
        }
        Ok(())
    }
}

fn parse_orderbook_update(value: Value) -> Result<OrderbookSnapshot> {
    let update: OrderbookStreamUpdate = serde_json::from_value(value)?;
    Ok(update.orderbook)
}

fn parse_order_status_update(value: Value) -> Result<OrderStatusUpdate> {
    let update: OrderStatusStreamUpdate = serde_json::from_value(value)?;
    let (market, event) = update.order_info.into_event(Utc::now());
    Ok(OrderStatusUpdate { market, event })
}

struct PendingRequest {
    reply: oneshot::Sender<Result<Value>>,
    subscribe: Option<mpsc::UnboundedSender<Value>>,
}

/// Connection task: owns the socket until `Close` arrives or the peer
/// goes away. Dropping the subscription senders ends the downstream
/// per-subscription streams.
async fn run_connection(mut stream: WsStream, mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut pending: HashMap<u64, PendingRequest> = HashMap::new();
    let mut subscriptions: HashMap<String, mpsc::UnboundedSender<Value>> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Request { id, text, reply, subscribe }) => {
                    if let Err(e) = stream.send(Message::Text(text)).await {
                        let _ = reply.send(Err(e.into()));
                        break;
                    }
                    pending.insert(id, PendingRequest { reply, subscribe });
                }
                Some(Command::Close) | None => {
                    let _ = stream.close(None).await;
                    break;
                }
            },
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    dispatch(&text, &mut pending, &mut subscriptions);
                }
                Some(Ok(Message::Ping(data))) => {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    warn!(frame = ?frame, "WebSocket closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
                None => {
                    warn!("WebSocket stream ended");
                    break;
                }
            },
        }
    }

    for (_, request) in pending.drain() {
        let _ = request.reply.send(Err(MarketDataError::WebSocketConnection(
            "connection closed".to_string(),
        )));
    }
}

fn dispatch(
    text: &str,
    pending: &mut HashMap<u64, PendingRequest>,
    subscriptions: &mut HashMap<String, mpsc::UnboundedSender<Value>>,
) {
    let message: WsMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "dropping malformed frame");
            return;
        }
    };

    if message.method.as_deref() == Some("subscribe") {
        let Some(params) = message.params else {
            warn!("subscription notification without params");
            return;
        };
        if let Some(sink) = subscriptions.get(&params.subscription) {
            if sink.send(params.result).is_err() {
                // Receiver dropped: the listener is gone
                subscriptions.remove(&params.subscription);
            }
        } else {
            debug!(subscription = %params.subscription, "notification for unknown subscription");
        }
        return;
    }

    if let Some(id) = message.id {
        let Some(request) = pending.remove(&id) else {
            debug!(id, "response for unknown request id");
            return;
        };
        let outcome = match message.error {
            Some(error) => Err(MarketDataError::Subscription(format!(
                "request {id} failed with code {}: {}",
                error.code, error.message
            ))),
            None => {
                let result = message.result.unwrap_or(Value::Null);
                if let (Some(sink), Value::String(subscription)) = (request.subscribe, &result) {
                    subscriptions.insert(subscription.clone(), sink);
                }
                Ok(result)
            }
        };
        let _ = request.reply.send(outcome);
    }
}

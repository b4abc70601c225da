//! Notification sink boundary
//!
//! Order status changes are surfaced to the operator through an injected
//! sink rather than a global application handle.

use rust_decimal::Decimal;
use tracing::info;

use crate::types::{OrderStatusEvent, Side};

/// Receiver for human-readable order status notifications
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str);
}

/// Production sink: emits notifications on the tracing pipeline
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, message: &str) {
        info!("{}", message);
    }
}

/// Format an order status change for the notification sink.
///
/// Bid-side quantities arrive as quote-currency notional and are converted
/// to base units by dividing by the order price; the ledger keeps the raw
/// values. A zero order price leaves the quantities unconverted.
pub fn format_order_status(event: &OrderStatusEvent) -> String {
    let mut released = event.quantity_released;
    let mut remaining = event.quantity_remaining;
    if event.side == Side::Bid && event.order_price > Decimal::ZERO {
        released /= event.order_price;
        remaining /= event.order_price;
    }

    format!(
        "order type {} | quantity released: {} | quantity remaining: {} | price: {} | side: {} | id {}",
        event.order_status, released, remaining, event.order_price, event.side, event.client_order_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn event(side: Side) -> OrderStatusEvent {
        OrderStatusEvent {
            order_status: OrderStatus::PartiallyFilled,
            quantity_released: dec!(6),
            quantity_remaining: dec!(3),
            side,
            fill_price: dec!(3),
            order_price: dec!(3),
            client_order_id: 77,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_ask_quantities_are_reported_raw() {
        assert_eq!(
            format_order_status(&event(Side::Ask)),
            "order type PARTIALLY_FILLED | quantity released: 6 | quantity remaining: 3 \
             | price: 3 | side: ASK | id 77"
        );
    }

    #[test]
    fn test_bid_quantities_are_converted_to_base_units() {
        assert_eq!(
            format_order_status(&event(Side::Bid)),
            "order type PARTIALLY_FILLED | quantity released: 2 | quantity remaining: 1 \
             | price: 3 | side: BID | id 77"
        );
    }

    #[test]
    fn test_zero_order_price_skips_conversion() {
        let mut event = event(Side::Bid);
        event.order_price = dec!(0);
        let message = format_order_status(&event);
        assert!(message.contains("quantity released: 6"));
        assert!(message.contains("quantity remaining: 3"));
    }

    #[test]
    fn test_sink_receives_formatted_message() {
        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(|message: &str| message.starts_with("order type PARTIALLY_FILLED"))
            .times(1)
            .return_const(());

        sink.notify(&format_order_status(&event(Side::Ask)));
    }
}

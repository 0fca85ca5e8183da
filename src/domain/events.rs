use serde::{Deserialize, Serialize};
use std::fmt;

/// Order-status change event published to the downstream queue.
///
/// Delivery is best-effort and at-least-once; consumers (kitchen,
/// fulfillment) must tolerate duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusEvent {
    /// Payment lifecycle started for the order
    OrderSentToPayment,
    /// Payment confirmed, order handed over to the kitchen
    SentToKitchen,
    /// Payment cancelled
    Cancelled,
}

impl fmt::Display for OrderStatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatusEvent::OrderSentToPayment => write!(f, "ORDER_SENT_TO_PAYMENT"),
            OrderStatusEvent::SentToKitchen => write!(f, "SENT_TO_KITCHEN"),
            OrderStatusEvent::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

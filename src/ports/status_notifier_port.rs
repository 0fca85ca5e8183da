use crate::domain::OrderStatusEvent;
use async_trait::async_trait;

/// Downstream order-status publisher.
///
/// Fire-and-forget with best-effort delivery: `publish` never fails, it
/// returns `false` when the message was not delivered. The orchestrator
/// inspects the flag for diagnostics only, never for control flow.
#[async_trait]
pub trait StatusNotifierPort: Send + Sync {
    async fn publish(&self, order_id: &str, event: OrderStatusEvent) -> bool;
}

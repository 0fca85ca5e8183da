use crate::domain::OrderStatusEvent;
use crate::infrastructure::config::QueueConfig;
use crate::ports::StatusNotifierPort;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Status publisher posting to the queue's HTTP ingress.
///
/// At-least-once, best-effort: any failure is reported as `false` and
/// logged, never raised. Retry policy belongs to the queue side.
#[derive(Clone)]
pub struct HttpQueueNotifier {
    config: Arc<QueueConfig>,
    client: Client,
}

impl HttpQueueNotifier {
    pub fn new(config: Arc<QueueConfig>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn message_body(order_id: &str, event: OrderStatusEvent) -> serde_json::Value {
        json!({ "order_id": order_id, "status": event })
    }
}

#[async_trait]
impl StatusNotifierPort for HttpQueueNotifier {
    async fn publish(&self, order_id: &str, event: OrderStatusEvent) -> bool {
        let body = Self::message_body(order_id, event);
        debug!(order_id = %order_id, event = %event, "publishing order status");

        let result = self
            .client
            .post(&self.config.queue_url)
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                debug!(order_id = %order_id, "order status published");
                true
            }
            Err(e) => {
                warn!(order_id = %order_id, event = %event, "status publish failed: {e}");
                false
            }
        }
    }
}

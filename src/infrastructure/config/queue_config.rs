use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Downstream status queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// HTTP ingress URL of the order-status queue
    pub queue_url: String,
}

impl QueueConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            queue_url: std::env::var("STATUS_QUEUE_URL").expect("STATUS_QUEUE_URL must be set"),
        })
    }
}

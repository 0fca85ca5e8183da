pub mod adapters;
pub mod config;

pub use adapters::{HttpQueueNotifier, MercadoPagoAdapter, MySqlPaymentStore};
pub use config::{MercadoPagoConfig, QueueConfig};

pub mod payment_gateway_port;
pub mod payment_store_port;
pub mod status_notifier_port;

pub use payment_gateway_port::{PaymentGatewayPort, QrCodeIssue, WebhookNotification};
pub use payment_store_port::PaymentStorePort;
pub use status_notifier_port::StatusNotifierPort;

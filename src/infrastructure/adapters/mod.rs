pub mod http_queue_notifier;
pub mod mercado_pago_adapter;
pub mod mysql_payment_store;

pub use http_queue_notifier::HttpQueueNotifier;
pub use mercado_pago_adapter::MercadoPagoAdapter;
pub use mysql_payment_store::MySqlPaymentStore;

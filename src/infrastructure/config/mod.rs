pub mod mercado_pago_config;
pub mod queue_config;

pub use mercado_pago_config::MercadoPagoConfig;
pub use queue_config::QueueConfig;

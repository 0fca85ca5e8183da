use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mercado Pago gateway configuration.
///
/// Loaded once at startup and handed to the adapter constructor; nothing
/// else reads the environment for gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MercadoPagoConfig {
    /// API access token
    pub access_token: String,

    /// Collector (seller) account id
    pub user_id: String,

    /// Point-of-sale id the QR orders are issued against
    pub pos_id: String,

    /// Public URL the gateway posts webhook notifications to
    pub notification_url: String,

    /// API base URL
    pub base_url: String,
}

impl MercadoPagoConfig {
    pub fn from_env() -> Arc<Self> {
        Arc::new(Self {
            access_token: std::env::var("MERCADO_PAGO_ACCESS_TOKEN")
                .expect("MERCADO_PAGO_ACCESS_TOKEN must be set"),
            user_id: std::env::var("MERCADO_PAGO_USER_ID")
                .expect("MERCADO_PAGO_USER_ID must be set"),
            pos_id: std::env::var("MERCADO_PAGO_POS_ID")
                .expect("MERCADO_PAGO_POS_ID must be set"),
            notification_url: std::env::var("MERCADO_PAGO_NOTIFICATION_URL")
                .expect("MERCADO_PAGO_NOTIFICATION_URL must be set"),
            base_url: std::env::var("MERCADO_PAGO_BASE_URL")
                .unwrap_or_else(|_| "https://api.mercadopago.com".to_string()),
        })
    }
}

mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;

use api::AppState;
use application::PaymentService;
use infrastructure::{
    HttpQueueNotifier, MercadoPagoAdapter, MercadoPagoConfig, MySqlPaymentStore, QueueConfig,
};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    info!("Starting Order Payment Service...");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    info!("Connecting to database...");

    let pool = MySqlPool::connect(&database_url).await?;
    info!("Database connected successfully");

    let gateway_config = MercadoPagoConfig::from_env();
    info!(
        "Mercado Pago configuration loaded for collector: {}",
        gateway_config.user_id
    );
    let queue_config = QueueConfig::from_env();

    let store = Arc::new(MySqlPaymentStore::new(Arc::new(pool)));
    let gateway = Arc::new(MercadoPagoAdapter::new(gateway_config));
    let notifier = Arc::new(HttpQueueNotifier::new(queue_config));

    let payment_service = Arc::new(PaymentService::new(store, gateway, notifier));

    let app_state = AppState { payment_service };
    let app = api::create_router(app_state);

    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /payment/start - Start a payment for an order");
    info!("  GET  /payment/status/:order_id - Query payment status");
    info!("  POST /payment/webhook - Gateway payment webhook");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

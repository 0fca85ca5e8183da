use super::handlers::*;
use crate::ports::{PaymentGatewayPort, PaymentStorePort, StatusNotifierPort};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router<S, G, N>(state: AppState<S, G, N>) -> Router
where
    S: PaymentStorePort + 'static,
    G: PaymentGatewayPort + 'static,
    N: StatusNotifierPort + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/payment/start", post(start_payment))
        .route("/payment/status/:order_id", get(payment_status))
        .route("/payment/webhook", post(gateway_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use crate::application::{ErrorResponse, PaymentResponse, PaymentService, WebhookAck};
use crate::domain::errors::DomainError;
use crate::domain::Order;
use crate::ports::{PaymentGatewayPort, PaymentStorePort, StatusNotifierPort};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
pub struct AppState<S, G, N> {
    pub payment_service: Arc<PaymentService<S, G, N>>,
}

impl<S, G, N> Clone for AppState<S, G, N> {
    fn clone(&self) -> Self {
        Self {
            payment_service: Arc::clone(&self.payment_service),
        }
    }
}

fn error_response(code: &str, e: DomainError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        DomainError::PaymentNotFound(_) | DomainError::GatewayPaymentNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        DomainError::Validation(_)
        | DomainError::InvalidAmount(_)
        | DomainError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

/// Start a payment lifecycle for an order
pub async fn start_payment<S, G, N>(
    State(state): State<AppState<S, G, N>>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    S: PaymentStorePort + 'static,
    G: PaymentGatewayPort + 'static,
    N: StatusNotifierPort + 'static,
{
    info!(order_id = %order.id, "received start payment request");

    state
        .payment_service
        .start(&order)
        .await
        .map(|payment| (StatusCode::CREATED, Json(PaymentResponse::from(payment))))
        .map_err(|e| {
            error!(order_id = %order.id, "payment start error: {e}");
            error_response("PAYMENT_ERROR", e)
        })
}

/// Current payment status for an order
pub async fn payment_status<S, G, N>(
    State(state): State<AppState<S, G, N>>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)>
where
    S: PaymentStorePort + 'static,
    G: PaymentGatewayPort + 'static,
    N: StatusNotifierPort + 'static,
{
    info!(order_id = %order_id, "received payment status request");

    state
        .payment_service
        .query_status(&order_id)
        .await
        .map(|payment| (StatusCode::OK, Json(PaymentResponse::from(payment))))
        .map_err(|e| {
            error!(order_id = %order_id, "payment query error: {e}");
            error_response("QUERY_ERROR", e)
        })
}

/// Gateway webhook endpoint.
///
/// Always acknowledges with `ok: true`: the gateway retries on anything
/// else, and reconciliation already reduces every failure to a logged
/// no-op.
pub async fn gateway_webhook<S, G, N>(
    State(state): State<AppState<S, G, N>>,
    body: Bytes,
) -> impl IntoResponse
where
    S: PaymentStorePort + 'static,
    G: PaymentGatewayPort + 'static,
    N: StatusNotifierPort + 'static,
{
    info!("received gateway webhook");

    // Raw bytes, converted lossily: a malformed body must still be
    // acknowledged, not rejected by the extractor.
    let payload = String::from_utf8_lossy(&body);
    state.payment_service.reconcile_webhook(&payload).await;

    (StatusCode::OK, Json(WebhookAck { ok: true }))
}

/// Health check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

use crate::domain::Payment;
use serde::Serialize;

/// Payment view returned by the HTTP surface.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub status: String,
    pub qr_code: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            status: payment.status.to_string(),
            qr_code: payment.qr_code,
        }
    }
}

/// Acknowledgement returned to the gateway webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

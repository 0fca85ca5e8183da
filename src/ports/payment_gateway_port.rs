use crate::domain::errors::DomainResult;
use crate::domain::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// QR code issued by the gateway for an order.
///
/// Both fields empty means the gateway declined to issue a code; that is
/// a business outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeIssue {
    pub gateway_reference: String,
    pub qr_code: String,
}

impl QrCodeIssue {
    pub fn declined() -> Self {
        Self {
            gateway_reference: String::new(),
            qr_code: String::new(),
        }
    }

    pub fn is_issued(&self) -> bool {
        !self.gateway_reference.is_empty()
    }
}

/// Webhook payload normalized by the gateway adapter.
///
/// An empty `gateway_reference` signals an unparseable payload or a
/// transaction that is not yet final; reconciliation treats it as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotification {
    pub gateway_reference: String,
    pub raw_status: String,
    pub paid: bool,
}

impl WebhookNotification {
    pub fn empty() -> Self {
        Self {
            gateway_reference: String::new(),
            raw_status: String::new(),
            paid: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gateway_reference.is_empty()
    }
}

/// External payment gateway.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    /// Request a QR code for the order. Issuance refusal is signalled by an
    /// empty [`QrCodeIssue`]; transport failures propagate as errors.
    async fn issue_qr_code(&self, order: &Order, description: &str) -> DomainResult<QrCodeIssue>;

    /// Parse a raw webhook payload into a normalized notification.
    ///
    /// Never fails: any internal error is converted into the empty
    /// notification, so the webhook boundary can always acknowledge the
    /// gateway. Failures are still logged for monitoring.
    async fn parse_webhook(&self, raw_payload: &str) -> WebhookNotification;
}

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{Money, PaymentStatus, Quantity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream order this payment is collected against.
///
/// Produced by the order service; the payment core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier, globally unique per order
    pub id: String,

    /// Order total
    pub total: Money,

    /// Line items
    #[serde(default)]
    pub items: Vec<OrderItem>,

    /// Customer reference, when the order was placed by an identified customer
    #[serde(default)]
    pub customer: Option<OrderCustomer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl OrderItem {
    /// Line total for this item.
    pub fn total(&self) -> DomainResult<Money> {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCustomer {
    pub name: String,
    pub email: String,
    pub document: String,
}

/// Payment entity, tracking money collected for one order through the
/// external gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Internal id assigned by the store on creation; 0 means not yet persisted
    pub id: i64,

    /// Order this payment is for; one payment lifecycle is active per order
    pub order_id: String,

    /// Amount to collect, set from the order total
    pub amount: Money,

    /// Current lifecycle state
    pub status: PaymentStatus,

    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,

    /// Gateway-assigned transaction reference; empty until a QR code is issued
    pub gateway_reference: String,

    /// Payer-facing QR payload; empty until issued
    pub qr_code: String,
}

impl Payment {
    /// Create a payment in its initial state, with no gateway data attached.
    pub fn new(id: i64, order_id: String, amount: Money) -> Self {
        Self {
            id,
            order_id,
            amount,
            status: PaymentStatus::AwaitingResponse,
            created_at: Utc::now(),
            gateway_reference: String::new(),
            qr_code: String::new(),
        }
    }

    /// Whether the store has assigned an id to this record.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Attach the gateway reference and QR payload issued for this payment.
    ///
    /// Invariant: reference and QR code are either both empty or both set,
    /// so a partial issuance is rejected here.
    pub fn attach_gateway_qr(&mut self, reference: String, qr_code: String) -> DomainResult<()> {
        if reference.is_empty() || qr_code.is_empty() {
            return Err(DomainError::Validation(
                "gateway reference and qr code must both be present".to_string(),
            ));
        }
        self.gateway_reference = reference;
        self.qr_code = qr_code;
        Ok(())
    }

    /// Move to `Paid`. The status is overwritten unconditionally; callers
    /// are responsible for not confirming a payment twice.
    pub fn mark_paid(&mut self) {
        self.status = PaymentStatus::Paid;
    }

    /// Move to `Cancelled`. Same overwrite contract as [`Payment::mark_paid`].
    pub fn mark_cancelled(&mut self) {
        self.status = PaymentStatus::Cancelled;
    }

    /// Whether this payment still awaits a gateway outcome.
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }
}

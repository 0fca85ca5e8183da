use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{Money, Order, Payment, PaymentStatus};
use crate::ports::PaymentStorePort;
use async_trait::async_trait;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tracing::{debug, error};

/// MySQL-backed payment store.
#[derive(Clone)]
pub struct MySqlPaymentStore {
    pool: Arc<Pool<MySql>>,
}

impl MySqlPaymentStore {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    async fn load_by_id(&self, id: i64) -> DomainResult<Option<Payment>> {
        let query = r#"
            SELECT id, order_id, amount_cents, status,
                   gateway_reference, qr_code, created_at
            FROM payments
            WHERE id = ?
        "#;

        let row = sqlx::query_as::<_, PaymentRow>(query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(PaymentRow::into_payment).transpose()
    }
}

#[async_trait]
impl PaymentStorePort for MySqlPaymentStore {
    async fn create(&self, order: &Order) -> DomainResult<Payment> {
        let payment = Payment::new(0, order.id.clone(), order.total);

        let query = r#"
            INSERT INTO payments (
                order_id, amount_cents, status,
                gateway_reference, qr_code, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(&payment.order_id)
            .bind(payment.amount.to_cents())
            .bind(payment.status.to_string())
            .bind(&payment.gateway_reference)
            .bind(&payment.qr_code)
            .bind(payment.created_at)
            .execute(self.pool.as_ref())
            .await?;

        let id = result.last_insert_id() as i64;
        debug!(payment_id = id, order_id = %order.id, "payment record created");

        self.load_by_id(id)
            .await?
            .ok_or(DomainError::PaymentNotCreated)
    }

    async fn update(&self, payment: &Payment) -> DomainResult<Payment> {
        // Id 0 means the record was never persisted; refuse before touching
        // the database.
        if !payment.is_persisted() {
            return Err(DomainError::PaymentNotPersisted);
        }

        let query = r#"
            UPDATE payments
            SET amount_cents = ?, status = ?, gateway_reference = ?, qr_code = ?
            WHERE id = ?
        "#;

        let rows_affected = sqlx::query(query)
            .bind(payment.amount.to_cents())
            .bind(payment.status.to_string())
            .bind(&payment.gateway_reference)
            .bind(&payment.qr_code)
            .bind(payment.id)
            .execute(self.pool.as_ref())
            .await?
            .rows_affected();

        if rows_affected == 0 {
            error!(payment_id = payment.id, "no payment found to update");
            return Err(DomainError::PaymentNotFound(payment.order_id.clone()));
        }

        debug!(payment_id = payment.id, "payment record updated");

        self.load_by_id(payment.id)
            .await?
            .ok_or_else(|| DomainError::PaymentNotFound(payment.order_id.clone()))
    }

    async fn find_by_order(&self, order_id: &str) -> DomainResult<Payment> {
        // Most recent record wins when an order somehow has more than one.
        let query = r#"
            SELECT id, order_id, amount_cents, status,
                   gateway_reference, qr_code, created_at
            FROM payments
            WHERE order_id = ?
            ORDER BY id DESC
            LIMIT 1
        "#;

        let row = sqlx::query_as::<_, PaymentRow>(query)
            .bind(order_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(PaymentRow::into_payment)
            .transpose()?
            .ok_or_else(|| DomainError::PaymentNotFound(order_id.to_string()))
    }

    async fn find_by_gateway_reference(&self, reference: &str) -> DomainResult<Payment> {
        let query = r#"
            SELECT id, order_id, amount_cents, status,
                   gateway_reference, qr_code, created_at
            FROM payments
            WHERE gateway_reference = ? AND gateway_reference <> ''
            LIMIT 1
        "#;

        let row = sqlx::query_as::<_, PaymentRow>(query)
            .bind(reference)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(PaymentRow::into_payment)
            .transpose()?
            .ok_or_else(|| DomainError::GatewayPaymentNotFound(reference.to_string()))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    order_id: String,
    amount_cents: i64,
    status: String,
    gateway_reference: String,
    qr_code: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> DomainResult<Payment> {
        let status = match self.status.as_str() {
            "awaiting_response" => PaymentStatus::AwaitingResponse,
            "paid" => PaymentStatus::Paid,
            "cancelled" => PaymentStatus::Cancelled,
            other => {
                return Err(DomainError::Validation(format!(
                    "unknown payment status in store: {other}"
                )))
            }
        };

        Ok(Payment {
            id: self.id,
            order_id: self.order_id,
            amount: Money::from_cents(self.amount_cents)?,
            status,
            created_at: self.created_at,
            gateway_reference: self.gateway_reference,
            qr_code: self.qr_code,
        })
    }
}

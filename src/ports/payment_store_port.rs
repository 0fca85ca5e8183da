use crate::domain::errors::DomainResult;
use crate::domain::{Order, Payment};
use async_trait::async_trait;

/// Keyed record store for payments.
///
/// The store is the only shared mutable resource in the system; each call
/// is an atomic read-then-write. Non-empty gateway references are unique
/// across records.
#[async_trait]
pub trait PaymentStorePort: Send + Sync {
    /// Create the pending payment record for an order, with the order total
    /// as its amount. Fails with `PaymentNotCreated` when no record comes back.
    async fn create(&self, order: &Order) -> DomainResult<Payment>;

    /// Persist the mutable fields of an existing payment and return the
    /// stored record. Fails with `PaymentNotPersisted` when the payment has
    /// no assigned id, without querying the store.
    async fn update(&self, payment: &Payment) -> DomainResult<Payment>;

    /// Most recently created payment for the order.
    /// Fails with `PaymentNotFound`.
    async fn find_by_order(&self, order_id: &str) -> DomainResult<Payment>;

    /// Payment carrying the given gateway reference.
    /// Fails with `GatewayPaymentNotFound`.
    async fn find_by_gateway_reference(&self, reference: &str) -> DomainResult<Payment>;
}

use thiserror::Error;

/// Domain-level error kinds.
///
/// The four payment errors are raised to the immediate caller of the
/// orchestrator operation and are not recoverable within the core. The
/// webhook reconciliation path is the one place that suppresses them.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Store failed to persist a new payment
    #[error("payment was not created")]
    PaymentNotCreated,

    /// No payment record for the given order
    #[error("payment not found for order {0}")]
    PaymentNotFound(String),

    /// No payment record for the given gateway reference
    #[error("no payment matches gateway reference {0}")]
    GatewayPaymentNotFound(String),

    /// Update attempted on a payment with no assigned id
    #[error("payment has not been persisted yet")]
    PaymentNotPersisted,

    /// Amount is negative or otherwise malformed
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Quantity below 1
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Input validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

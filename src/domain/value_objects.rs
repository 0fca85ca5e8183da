use crate::domain::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status, the three legal states of a payment lifecycle.
///
/// `AwaitingResponse` is the only initial state; `Paid` and `Cancelled`
/// are terminal. The orchestrator overwrites the status on confirmation
/// and cancellation without re-checking it, so redundant invocations are
/// the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created, waiting for the gateway to confirm or decline
    AwaitingResponse,
    /// Confirmed by the gateway
    Paid,
    /// Cancelled, either explicitly or because QR issuance failed
    Cancelled,
}

impl PaymentStatus {
    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::AwaitingResponse => write!(f, "awaiting_response"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Monetary amount in cents, guaranteed non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money {
    amount_cents: i64,
}

impl Money {
    /// Create an amount from cents, rejecting negative values.
    pub fn from_cents(cents: i64) -> Result<Self, DomainError> {
        if cents < 0 {
            return Err(DomainError::InvalidAmount(format!(
                "amount must not be negative, got {cents}"
            )));
        }
        Ok(Self {
            amount_cents: cents,
        })
    }

    pub fn to_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Line total for `quantity` units of this amount.
    pub fn times(&self, quantity: Quantity) -> Result<Money, DomainError> {
        self.amount_cents
            .checked_mul(i64::from(quantity.value()))
            .map(|amount_cents| Money { amount_cents })
            .ok_or_else(|| {
                DomainError::InvalidAmount(format!(
                    "line total overflows: {} cents x {}",
                    self.amount_cents, quantity
                ))
            })
    }
}

impl TryFrom<i64> for Money {
    type Error = DomainError;

    fn try_from(cents: i64) -> Result<Self, Self::Error> {
        Money::from_cents(cents)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> i64 {
        money.amount_cents
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R${:.2}", self.amount_cents as f64 / 100.0)
    }
}

/// Item quantity, guaranteed to be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> u32 {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

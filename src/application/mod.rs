pub mod dto;
pub mod payment_service;

pub use dto::{ErrorResponse, PaymentResponse, WebhookAck};
pub use payment_service::PaymentService;

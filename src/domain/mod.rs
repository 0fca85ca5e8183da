pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;

pub use entities::{Order, OrderCustomer, OrderItem, Payment};
pub use errors::{DomainError, DomainResult};
pub use events::OrderStatusEvent;
pub use value_objects::{Money, PaymentStatus, Quantity};

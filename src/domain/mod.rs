//! Domain module
//!
//! Core domain types and business logic.

pub mod error;
pub mod status;
pub mod stock;

pub use error::DomainError;
pub use status::{OrderStatus, PaymentStatus};

//! suppstore_admin Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod catalog;
pub mod configstore;
pub mod domain;
pub mod orders;

// Infrastructure (used by the binary and test setup)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainError, OrderStatus, PaymentStatus};

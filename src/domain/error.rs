//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced entity does not exist (or is soft-deleted)
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Requested status change is not reachable from the current status
    #[error("Invalid {kind} status transition: {from} -> {to}")]
    InvalidTransition {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// Structurally invalid input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Operation would violate a uniqueness/consistency invariant
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    /// Create a not-found error for a named entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an invalid order-status transition error
    pub fn invalid_order_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            kind: "order",
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create an invalid payment-status transition error
    pub fn invalid_payment_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            kind: "payment",
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

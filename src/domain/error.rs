//! Domain validation errors for core domain types.
//!
//! These errors are returned when a precondition of the earnings model or
//! the allocation optimizer is violated. Degenerate data (zero pools, zero
//! stakes) is deliberately *not* an error: those ratios are defined as 0.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Budget must be positive to run an optimization.
    #[error("budget must be positive, got {budget}")]
    NonPositiveBudget {
        /// The invalid budget that was provided.
        budget: f64,
    },

    /// Price must be positive for any earnings/APR computation.
    #[error("price must be positive, got {price}")]
    NonPositivePrice {
        /// The invalid price that was provided.
        price: f64,
    },
}

//! # Error Types
//!
//! Domain-specific error types for cantina-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cantina-core errors (this file)                                       │
//! │  ├── CoreError        - business rule violations                       │
//! │  └── ValidationError  - input validation failures                      │
//! │                                                                         │
//! │  cantina-db errors (separate crate)                                    │
//! │  ├── DbError          - storage operation failures                     │
//! │  └── EngineError      - validation/conflict/not-found/storage taxonomy │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → ApiError → client               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Order has more distinct lines than allowed.
    #[error("Order cannot have more than {max} lines")]
    OrderTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Reported synchronously, before any storage mutation is attempted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// A direct sale was submitted with no items.
    #[error("a direct sale must contain at least one item")]
    EmptyOrder,

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 1200,
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 1200 exceeds maximum allowed (999)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive { field: "amount" };
        assert_eq!(err.to_string(), "amount must be positive");

        let err = ValidationError::EmptyOrder;
        assert_eq!(err.to_string(), "a direct sale must contain at least one item");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "name" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

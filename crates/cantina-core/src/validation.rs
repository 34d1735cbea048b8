//! # Validation Module
//!
//! Input validation for Cantina POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API handler (deserialization, type shape)                    │
//! │  Layer 2: THIS MODULE - business rule validation, before any storage   │
//! │           mutation is attempted                                         │
//! │  Layer 3: Database - NOT NULL / UNIQUE / FOREIGN KEY constraints       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::order::OrderLine;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Order Validators
// =============================================================================

/// Validates the lines of a sale about to be processed.
///
/// ## Rules
/// - at most [`MAX_ORDER_LINES`] lines
/// - every quantity strictly positive and at most [`MAX_LINE_QUANTITY`]
/// - every unit price non-negative (zero allows comped items)
pub fn validate_sale_lines(lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items",
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in lines {
        if line.quantity <= 0 {
            return Err(ValidationError::MustBePositive { field: "quantity" });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
        if line.price < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "price" });
        }
    }

    Ok(())
}

/// Validates the lines of a draft order about to be saved.
///
/// Quantities are not checked here: non-positive ones are *dropped* by
/// normalization instead (the "clear cart" path). Prices must still be sane.
pub fn validate_draft_lines(lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items",
            min: 0,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in lines {
        if line.price < 0 {
            return Err(ValidationError::MustNotBeNegative { field: "price" });
        }
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an amount that must be strictly positive (payments, credit totals).
pub fn validate_positive_amount(field: &'static str, amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(())
}

/// Validates an amount that must not be negative (declared totals, balances).
pub fn validate_non_negative_amount(field: &'static str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative { field });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (products, tables, credit parties).
pub fn validate_name(field: &'static str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong { field, max: 200 });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # cantina-core: Pure Business Logic for Cantina POS
//!
//! This crate is the heart of Cantina POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cantina POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     REST API (apps/server)                      │   │
//! │  │   /api/sales/process  /api/cash/open  /api/credits  ...        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                cantina-db (engines + repositories)              │   │
//! │  │   SaleEngine • CashRegister • CreditBook • SQLite queries       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cantina-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   order   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ OrderLine │  │   rules   │  │   │
//! │  │   │   Sale    │  │  totals   │  │ normalize │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Table, Sale, CashSession, Credit, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`order`] - Order-line normalization and total computation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are whole currency units (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use order::{normalize_lines, order_total, OrderLine};
pub use types::*;

use uuid::Uuid;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single order.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line in an order.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Stock level below which a product counts as "low stock" on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Generates a fresh idempotency key for same-process sale submissions.
///
/// Browser clients generate their own keys; this helper gives embedded
/// callers (tests, replay queues) the same at-most-once protection.
pub fn generate_idempotency_key() -> String {
    Uuid::new_v4().to_string()
}

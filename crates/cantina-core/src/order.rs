//! # Order Lines
//!
//! Pure order-line math shared by the sale engine and the API layer.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Client cart ──► OrderLine[] ──► normalize_lines ──► order_total        │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │              SaleEngine::save_order / SaleEngine::process_sale          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Saving an order *normalizes* (drops non-positive quantities, recomputes
//! the total from the lines); processing a sale *validates* instead, because
//! the client declares the charged total explicitly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// One requested line of an order: a product, a quantity, and the unit price
/// the client saw when it built the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    /// Product id (the frontend cart calls this `id`).
    #[serde(rename = "id")]
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in whole currency units, captured into the sale line.
    pub price: i64,
}

impl OrderLine {
    /// Line total (price x quantity) as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_units(self.price).multiply_quantity(self.quantity)
    }
}

/// Drops lines with a non-positive quantity.
///
/// This is the "clear cart" normalization: a client zeroing out every line
/// yields an empty order, which the engine treats as a table clear.
pub fn normalize_lines(lines: &[OrderLine]) -> Vec<OrderLine> {
    lines.iter().copied().filter(|l| l.quantity > 0).collect()
}

/// Sum of line totals in whole currency units.
pub fn order_total(lines: &[OrderLine]) -> i64 {
    lines.iter().map(OrderLine::line_total).sum::<Money>().units()
}

// =============================================================================
// Unit Tests
// =============================================================================

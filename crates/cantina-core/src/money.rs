//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: integer whole units                                      │
//! │    Prices in this domain carry no fractional cents, so a sale of       │
//! │    two items at 8000 is exactly 16000 - always.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cantina_core::money::Money;
//!
//! let price = Money::from_units(8000);
//! let line_total = price * 2;
//! assert_eq!(line_total.units(), 16000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for expense deltas and shortfalls
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Whole units**: this domain has no fractional cents (see spec of the
///   product catalog); the database stores the same integers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line quantity.
    ///
    /// Uses saturating arithmetic: a hostile quantity cannot overflow into
    /// a negative total.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let money = Money::from_units(8000);
        assert_eq!(money.units(), 8000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_units(8000)), "$8000");
        assert_eq!(format!("{}", Money::from_units(-500)), "$-500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        let result: Money = a * 3;
        assert_eq!(result.units(), 3000);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_units(8000);
        assert_eq!(unit_price.multiply_quantity(2).units(), 16000);
        assert_eq!(unit_price.multiply_quantity(0).units(), 0);
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let unit_price = Money::from_units(i64::MAX);
        assert_eq!(unit_price.multiply_quantity(2).units(), i64::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .into_iter()
            .map(Money::from_units)
            .sum();
        assert_eq!(total.units(), 600);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_units(100).is_positive());
        assert!(Money::from_units(-100).is_negative());
    }
}

//! # Domain Types
//!
//! Core domain types used throughout Cantina POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  LedgerEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  name           │   │  table_id?      │   │  entry_type     │       │
//! │  │  price, stock   │   │  status, total  │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │   CashSession   │   │     Credit      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  status free/   │   │  single open    │   │  receivable/    │       │
//! │  │  occupied       │   │  system-wide    │   │  payable        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by an auto-incrementing `i64` assigned by the
//! storage engine. A `Sale` optionally carries a client-supplied idempotency
//! key, unique among sales where present.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name shown on the sale screen and receipts.
    pub name: String,

    /// Unit price in whole currency units.
    pub price: i64,

    /// Current stock level. Decremented at sale time; may go negative when
    /// concurrent sales overdraw (accepted business risk, not an error).
    pub stock: i64,

    /// Category label ("bebidas", "licores", ...).
    pub category: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_units(self.price)
    }
}

// =============================================================================
// Table
// =============================================================================

/// Occupancy state of a table.
///
/// Derived state: `Occupied` holds exactly while a pending [`Sale`] references
/// the table. The engines restore this equivalence on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Free,
    Occupied,
}

/// A physical table (or bar seat) that can hold an open tab.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Table {
    pub id: i64,

    /// Display name, unique per location ("Mesa 3", "Barra 1").
    pub name: String,

    /// Kind of seat: "table" or "bar".
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub kind: String,

    pub capacity: i64,

    pub status: TableStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A table row joined with its current pending-order aggregates.
///
/// This is the reporting view that observes the occupancy invariant: a free
/// table shows a zero total and zero items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableWithOrder {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub kind: String,
    pub capacity: i64,
    pub status: TableStatus,
    /// Sum of pending sale totals for this table (0 when free).
    pub current_total: i64,
    /// Sum of pending line quantities for this table (0 when free).
    pub item_count: i64,
}

/// One line of a table's current pending order, as shown on the sale screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PendingOrderLine {
    /// Product id (aliased `id` for the frontend cart).
    pub id: i64,
    pub name: String,
    /// Unit price captured when the order was saved.
    pub price: i64,
    pub quantity: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// The lifecycle status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// An open tab / draft order, not yet paid.
    Pending,
    /// Paid and finalized.
    Paid,
}

/// Whether a sale was rung up against a table or as a walk-up checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    Direct,
    Table,
}

/// How money changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

/// A sale: either a paid checkout or the pending draft order of a table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// Actor who rang up the sale.
    pub user_id: i64,
    /// None for a direct (walk-up) sale.
    pub table_id: Option<i64>,
    /// Total in whole currency units, captured at save/process time.
    pub total: i64,
    pub sale_type: SaleType,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    /// Client-supplied token for at-most-once processing; unique when set.
    pub idempotency_key: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A line item of a sale.
///
/// The unit price is captured at sale time, so historical totals stay stable
/// under later product price changes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in whole currency units at time of sale (frozen).
    pub price: i64,
}

impl SaleItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_units(self.price).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Income,
    Expense,
}

/// One row of the income/expense ledger (the `transactions` table).
///
/// Append-only from the engines' perspective; manual edits are an
/// administrative override outside the core state machine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    pub id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub entry_type: EntryType,
    pub amount: i64,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub created_by: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Session
// =============================================================================

/// Whether a cash-drawer session is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// A bounded cash-drawer period between open and close.
///
/// Invariant: at most one session is open system-wide at any time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CashSession {
    pub id: i64,
    pub opened_by: i64,
    pub opening_balance: i64,
    pub closing_balance: Option<i64>,
    pub status: SessionStatus,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<i64>,
}

// =============================================================================
// Credit
// =============================================================================

/// Whether a credit is money owed to us or by us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    Receivable,
    Payable,
}

/// Settlement state of a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Open,
    Closed,
}

/// An accounts-receivable or accounts-payable record tracked outside the
/// immediate sale flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Credit {
    pub id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub credit_type: CreditType,
    pub description: String,
    /// Counterparty label (customer or supplier name).
    pub party: String,
    /// Total owed in whole currency units.
    pub total: i64,
    pub status: CreditStatus,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A partial payment against a credit.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CreditPayment {
    pub id: i64,
    pub credit_id: i64,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A credit joined with its derived payment standing.
///
/// `balance == total - paid_amount`; paid_amount is the sum of payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreditStanding {
    pub id: i64,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub credit_type: CreditType,
    pub description: String,
    pub party: String,
    pub total: i64,
    pub status: CreditStatus,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub paid_amount: i64,
    pub balance: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_item_line_total() {
        let item = SaleItem {
            id: 1,
            sale_id: 1,
            product_id: 7,
            quantity: 3,
            price: 8000,
        };
        assert_eq!(item.line_total().units(), 24000);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TableStatus::Occupied).unwrap(),
            "\"occupied\""
        );
        assert_eq!(
            serde_json::to_string(&SaleStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Transfer).unwrap(),
            "\"transfer\""
        );
    }

    #[test]
    fn test_table_kind_serialized_as_type() {
        let table = Table {
            id: 1,
            name: "Mesa 1".to_string(),
            kind: "table".to_string(),
            capacity: 4,
            status: TableStatus::Free,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["status"], "free");
    }
}

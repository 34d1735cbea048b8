//! # Transaction Engines
//!
//! Every multi-entity atomic unit of work in Cantina POS lives here.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     One Operation = One Transaction                     │
//! │                                                                         │
//! │  begin ──► read/validate ──► write, write, write ──► commit            │
//! │                  │                    │                                 │
//! │                  └── error ───────────┴──► drop(tx) = ROLLBACK         │
//! │                                                                         │
//! │  Each engine method is a single sequential procedure inside one        │
//! │  explicit transactional scope. Errors propagate with `?`; an early     │
//! │  return before commit rolls back every prior write of the unit.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cross-cutting invariants owned here:
//! - at-most-once sale processing (idempotency keys, unique-indexed)
//! - table occupancy ⇔ pending-sale existence
//! - at most one open cash session system-wide
//! - a credit's closing ledger entry is posted exactly once per transition

pub mod cash;
pub mod credit;
pub mod sale;

pub use cash::{CashRegister, RegisterSummary};
pub use credit::{CreditBook, NewCredit, StatusChange};
pub use sale::{OrderOutcome, ProcessSaleRequest, SaleEngine, SaleOutcome, SaveOrderRequest};

//! # cantina-db: Database Layer for Cantina POS
//!
//! This crate provides database access for the Cantina POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cantina POS Data Flow                             │
//! │                                                                         │
//! │  HTTP route (POST /api/sales/process)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cantina-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐  │   │
//! │  │   │   Database    │   │    Engines     │   │ Repositories  │  │   │
//! │  │   │   (pool.rs)   │◄──│  SaleEngine    │   │ ProductRepo   │  │   │
//! │  │   │               │   │  CashRegister  │   │ TableRepo     │  │   │
//! │  │   │ SqlitePool    │   │  CreditBook    │   │ LedgerRepo    │  │   │
//! │  │   │ + migrations  │   │  (atomic units)│   │ ...           │  │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, foreign keys ON)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and engine error types
//! - [`repository`] - Thin per-entity repositories
//! - [`engine`] - Transactional engines (every atomic unit of work)
//! - [`reports`] - Advisory read-only aggregates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cantina_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/cantina.db")).await?;
//!
//! let outcome = db.sale_engine().process_sale(request).await?;
//! let tables = db.tables().list_with_orders().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, EngineError, EngineResult};
pub use pool::{Database, DbConfig};

// Engine re-exports for convenience
pub use engine::{
    CashRegister, CreditBook, NewCredit, OrderOutcome, ProcessSaleRequest, RegisterSummary,
    SaleEngine, SaleOutcome, SaveOrderRequest, StatusChange,
};
pub use reports::{DashboardSummary, Reports};

// Repository re-exports for convenience
pub use repository::cash_session::{CashSessionRepository, SessionFilter};
pub use repository::credit::{CreditFilter, CreditRepository};
pub use repository::ledger::{CashFlow, LedgerFilter, LedgerRepository, NewLedgerEntry};
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::sale::SaleRepository;
pub use repository::table::{NewTable, TableRepository};

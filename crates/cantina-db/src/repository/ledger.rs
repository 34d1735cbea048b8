//! # Ledger Repository
//!
//! Database operations for the income/expense ledger (`transactions` table).
//!
//! The ledger is append-only from the engines' perspective: sale processing
//! and credit settlement post entries through their own transactions; this
//! repository covers manual postings and reporting reads.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use cantina_core::{EntryType, LedgerEntry, PaymentMethod};

/// Fields for posting a ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub entry_type: EntryType,
    pub amount: i64,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub created_by: Option<i64>,
}

/// Filters for listing ledger entries.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub entry_type: Option<EntryType>,
    pub payment_method: Option<PaymentMethod>,
    /// Inclusive lower bound (whole day).
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound (whole day).
    pub to: Option<NaiveDate>,
}

/// Cash movements since a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CashFlow {
    pub income: i64,
    pub expense: i64,
}

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Posts a ledger entry and returns its id.
    pub async fn insert(&self, new: &NewLedgerEntry) -> DbResult<i64> {
        debug!(entry_type = ?new.entry_type, amount = new.amount, "Posting ledger entry");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO transactions (type, amount, description, payment_method, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(new.entry_type)
        .bind(new.amount)
        .bind(&new.description)
        .bind(new.payment_method)
        .bind(new.created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Lists ledger entries, newest first, honoring the given filters.
    pub async fn list(&self, filter: &LedgerFilter) -> DbResult<Vec<LedgerEntry>> {
        let mut sql = String::from(
            "SELECT id, type, amount, description, payment_method, created_by, created_at
             FROM transactions WHERE 1=1",
        );
        if filter.entry_type.is_some() {
            sql.push_str(" AND type = ?");
        }
        if filter.payment_method.is_some() {
            sql.push_str(" AND payment_method = ?");
        }
        if filter.from.is_some() {
            sql.push_str(" AND created_at >= ?");
        }
        if filter.to.is_some() {
            sql.push_str(" AND created_at < ?");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut query = sqlx::query_as::<_, LedgerEntry>(&sql);
        if let Some(entry_type) = filter.entry_type {
            query = query.bind(entry_type);
        }
        if let Some(method) = filter.payment_method {
            query = query.bind(method);
        }
        if let Some(from) = filter.from {
            query = query.bind(day_start(from));
        }
        if let Some(to) = filter.to {
            query = query.bind(day_start(to) + chrono::Duration::days(1));
        }

        let entries = query.fetch_all(&self.pool).await?;
        Ok(entries)
    }

    /// Sums cash-method income and expense timestamped at or after `since`.
    ///
    /// Used by the cash register to suggest a closing balance.
    pub async fn cash_flow_since(&self, since: DateTime<Utc>) -> DbResult<CashFlow> {
        let (income, expense): (i64, i64) = sqlx::query_as(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0)
             FROM transactions
             WHERE payment_method = 'cash' AND created_at >= ?1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(CashFlow { income, expense })
    }

    /// Counts all ledger entries (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Midnight UTC at the start of the given day.
fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

// =============================================================================
// Unit Tests
// =============================================================================

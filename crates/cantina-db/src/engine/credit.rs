//! # Credit Book
//!
//! Receivable/payable tracking with partial payments.
//!
//! ## Ledger Coupling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payments are NOT ledgered individually. Only the CLOSING transition   │
//! │  posts a single entry for the net amount:                              │
//! │                                                                         │
//! │    amount = paid-to-date if > 0, else the full total                   │
//! │    type   = expense for a payable, income for a receivable             │
//! │                                                                         │
//! │  Reopening posts nothing (the close entry is not reversed).            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A credit auto-closes when paid-to-date reaches its total; the automatic
//! transition does not post a ledger entry either (the explicit SetStatus
//! close is the only ledgering event).

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use cantina_core::validation::{validate_name, validate_positive_amount};
use cantina_core::{Credit, CreditStatus, CreditType, EntryType, PaymentMethod};

/// Fields for creating a credit.
#[derive(Debug, Clone)]
pub struct NewCredit {
    pub credit_type: CreditType,
    pub description: String,
    /// Counterparty label (customer or supplier name).
    pub party: String,
    pub total: i64,
    pub due_date: Option<NaiveDate>,
}

/// Result of a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Rows changed (0 for a no-op transition to the current status).
    pub changes: u64,
    /// Ledger entry posted by a closing transition, if any.
    pub ledger_entry_id: Option<i64>,
}

/// The credit ledger engine.
#[derive(Debug, Clone)]
pub struct CreditBook {
    pool: SqlitePool,
}

impl CreditBook {
    /// Creates a new CreditBook.
    pub fn new(pool: SqlitePool) -> Self {
        CreditBook { pool }
    }

    /// Creates a credit and returns its id. `total` must be positive.
    pub async fn create(&self, new: &NewCredit) -> EngineResult<i64> {
        validate_positive_amount("total", new.total)?;
        validate_name("description", &new.description)?;
        validate_name("party", &new.party)?;

        debug!(party = %new.party, total = new.total, "Creating credit");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO credits (type, description, party, total, status, due_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(new.credit_type)
        .bind(&new.description)
        .bind(&new.party)
        .bind(new.total)
        .bind(CreditStatus::Open)
        .bind(new.due_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Records a payment against a credit; auto-closes it once paid-to-date
    /// reaches the total. One atomic unit.
    pub async fn add_payment(
        &self,
        credit_id: i64,
        amount: i64,
        payment_method: PaymentMethod,
    ) -> EngineResult<i64> {
        validate_positive_amount("amount", amount)?;

        let mut tx = self.pool.begin().await?;

        let credit = fetch_credit(&mut tx, credit_id).await?;

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO credit_payments (credit_id, amount, payment_method, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(credit_id)
        .bind(amount)
        .bind(payment_method)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let payment_id = result.last_insert_rowid();

        let paid = paid_to_date(&mut tx, credit_id).await?;
        if paid >= credit.total && credit.status == CreditStatus::Open {
            // Auto-close; the closing ledger entry belongs to the explicit
            // SetStatus transition only.
            sqlx::query("UPDATE credits SET status = ?2 WHERE id = ?1")
                .bind(credit_id)
                .bind(CreditStatus::Closed)
                .execute(&mut *tx)
                .await?;
            info!(credit_id, paid, "Credit fully paid, auto-closed");
        }

        tx.commit().await?;

        debug!(credit_id, payment_id, amount, "Credit payment recorded");
        Ok(payment_id)
    }

    /// Transitions a credit's status.
    ///
    /// No-op when the status is unchanged. Closing posts exactly one ledger
    /// entry (see module docs); reopening posts nothing.
    pub async fn set_status(
        &self,
        credit_id: i64,
        new_status: CreditStatus,
        actor: i64,
    ) -> EngineResult<StatusChange> {
        let mut tx = self.pool.begin().await?;

        let credit = fetch_credit(&mut tx, credit_id).await?;

        if credit.status == new_status {
            return Ok(StatusChange {
                changes: 0,
                ledger_entry_id: None,
            });
        }

        let result = sqlx::query("UPDATE credits SET status = ?2 WHERE id = ?1")
            .bind(credit_id)
            .bind(new_status)
            .execute(&mut *tx)
            .await?;

        let mut ledger_entry_id = None;
        if new_status == CreditStatus::Closed {
            let paid = paid_to_date(&mut tx, credit_id).await?;
            // Zero payments ledger the FULL total. Deliberate carry-over of
            // the original behavior; pinned by an acceptance test.
            let amount = if paid > 0 { paid } else { credit.total };
            let entry_type = match credit.credit_type {
                CreditType::Payable => EntryType::Expense,
                CreditType::Receivable => EntryType::Income,
            };
            let description = format!("Credit closed: {} - {}", credit.description, credit.party);

            let now = Utc::now();
            let entry = sqlx::query(
                "INSERT INTO transactions (type, amount, description, payment_method, created_by, created_at)
                 VALUES (?1, ?2, ?3, NULL, ?4, ?5)",
            )
            .bind(entry_type)
            .bind(amount)
            .bind(&description)
            .bind(actor)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            ledger_entry_id = Some(entry.last_insert_rowid());

            info!(credit_id, amount, ?entry_type, "Credit closed, ledger entry posted");
        }

        tx.commit().await?;

        Ok(StatusChange {
            changes: result.rows_affected(),
            ledger_entry_id,
        })
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

async fn fetch_credit(conn: &mut SqliteConnection, credit_id: i64) -> EngineResult<Credit> {
    let credit = sqlx::query_as::<_, Credit>(
        "SELECT id, type, description, party, total, status, due_date, created_at
         FROM credits WHERE id = ?1",
    )
    .bind(credit_id)
    .fetch_optional(&mut *conn)
    .await?;

    credit.ok_or(EngineError::NotFound {
        entity: "Credit",
        id: credit_id,
    })
}

async fn paid_to_date(conn: &mut SqliteConnection, credit_id: i64) -> EngineResult<i64> {
    let paid: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0) FROM credit_payments WHERE credit_id = ?1",
    )
    .bind(credit_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(paid)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Cash Register
//!
//! Cash-drawer session management and reconciliation.
//!
//! ## Single-Open-Session Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  At most one cash_sessions row has status = 'open', system-wide.       │
//! │                                                                         │
//! │  Enforcement is the partial unique index                               │
//! │  idx_cash_sessions_single_open: open() simply INSERTs and maps the     │
//! │  constraint violation to "Ya existe una caja abierta". There is no     │
//! │  check-then-insert window for two concurrent opens to slip through.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The suggested closing balance is advisory only: the operator enters the
//! actual counted amount, which may diverge.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, EngineError, EngineResult};
use crate::repository::cash_session::CashSessionRepository;
use crate::repository::ledger::LedgerRepository;
use cantina_core::validation::validate_non_negative_amount;
use cantina_core::SessionStatus;

/// Reconciliation snapshot for a session: opening balance plus cash
/// movements since open, and the derived suggested close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSummary {
    pub has_open: bool,
    pub session_id: Option<i64>,
    pub opening: i64,
    pub cash_income: i64,
    pub cash_expense: i64,
    /// `opening + cash_income - cash_expense`.
    pub suggested_close: i64,
}

/// The cash session manager.
#[derive(Debug, Clone)]
pub struct CashRegister {
    pool: SqlitePool,
}

impl CashRegister {
    /// Creates a new CashRegister.
    pub fn new(pool: SqlitePool) -> Self {
        CashRegister { pool }
    }

    /// Opens a cash session with the given counted opening balance.
    ///
    /// Fails with [`EngineError::RegisterAlreadyOpen`] (no mutation) when a
    /// session is already open.
    pub async fn open(&self, opening_balance: i64, opened_by: i64) -> EngineResult<i64> {
        validate_non_negative_amount("opening_balance", opening_balance)?;

        debug!(opening_balance, opened_by, "Opening cash session");

        let now = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO cash_sessions (opened_by, opening_balance, status, opened_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(opened_by)
        .bind(opening_balance)
        .bind(SessionStatus::Open)
        .bind(now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(result) => {
                let id = result.last_insert_rowid();
                info!(session_id = id, opening_balance, "Cash session opened");
                Ok(id)
            }
            Err(e) => {
                let db_err = DbError::from(e);
                if db_err.is_unique_violation_on("cash_sessions") {
                    Err(EngineError::RegisterAlreadyOpen)
                } else {
                    Err(db_err.into())
                }
            }
        }
    }

    /// Closes the open cash session, recording the counted closing balance.
    ///
    /// Fails with [`EngineError::NoOpenRegister`] when nothing is open.
    pub async fn close(&self, closing_balance: i64, closed_by: i64) -> EngineResult<u64> {
        validate_non_negative_amount("closing_balance", closing_balance)?;

        debug!(closing_balance, closed_by, "Closing cash session");

        let now = Utc::now();
        // The status guard makes the update race-safe: of two concurrent
        // closes, exactly one flips the row.
        let result = sqlx::query(
            "UPDATE cash_sessions
             SET closed_by = ?1, closing_balance = ?2, closed_at = ?3, status = ?4
             WHERE id = (SELECT id FROM cash_sessions WHERE status = 'open'
                         ORDER BY opened_at DESC, id DESC LIMIT 1)
               AND status = 'open'",
        )
        .bind(closed_by)
        .bind(closing_balance)
        .bind(now)
        .bind(SessionStatus::Closed)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NoOpenRegister);
        }

        info!(closing_balance, "Cash session closed");
        Ok(result.rows_affected())
    }

    /// Computes the reconciliation summary for a session.
    ///
    /// With no argument, targets the currently open session; a summary with
    /// `has_open == false` means nothing is open. An explicit id computes
    /// over that session's open time (NotFound when it does not exist).
    pub async fn summary(&self, session_id: Option<i64>) -> EngineResult<RegisterSummary> {
        let sessions = CashSessionRepository::new(self.pool.clone());

        let session = match session_id {
            Some(id) => match sessions.get_by_id(id).await? {
                Some(session) => session,
                None => {
                    return Err(EngineError::NotFound {
                        entity: "CashSession",
                        id,
                    })
                }
            },
            None => match sessions.latest_open().await? {
                Some(session) => session,
                None => return Ok(RegisterSummary::default()),
            },
        };

        let flow = LedgerRepository::new(self.pool.clone())
            .cash_flow_since(session.opened_at)
            .await?;

        Ok(RegisterSummary {
            has_open: session.status == SessionStatus::Open,
            session_id: Some(session.id),
            opening: session.opening_balance,
            cash_income: flow.income,
            cash_expense: flow.expense,
            suggested_close: session.opening_balance + flow.income - flow.expense,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ledger::NewLedgerEntry;
    use crate::testutil::test_db;
    use cantina_core::{EntryType, PaymentMethod};

    #[tokio::test]
    async fn test_second_open_fails_without_mutation() {
        let db = test_db().await;
        let register = db.cash_register();

        register.open(100000, 1).await.unwrap();
        let err = register.open(50000, 2).await.unwrap_err();
        assert!(matches!(err, EngineError::RegisterAlreadyOpen));
        assert_eq!(err.to_string(), "Ya existe una caja abierta");

        assert_eq!(db.cash_sessions().open_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_open_close_cycle_keeps_at_most_one_open() {
        let db = test_db().await;
        let register = db.cash_register();
        let sessions = db.cash_sessions();

        for cycle in 0..3 {
            register.open(1000 * cycle, 1).await.unwrap();
            assert_eq!(sessions.open_count().await.unwrap(), 1);
            register.close(2000 * cycle, 1).await.unwrap();
            assert_eq!(sessions.open_count().await.unwrap(), 0);
        }

        // After the cycles, reopening works again.
        register.open(500, 1).await.unwrap();
        assert_eq!(sessions.open_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_without_open_session_fails() {
        let db = test_db().await;
        let err = db.cash_register().close(1000, 1).await.unwrap_err();
        assert!(matches!(err, EngineError::NoOpenRegister));
        assert_eq!(err.to_string(), "No hay caja abierta");
    }

    #[tokio::test]
    async fn test_close_records_balance_and_closer() {
        let db = test_db().await;
        let register = db.cash_register();

        let id = register.open(100000, 1).await.unwrap();
        register.close(142000, 7).await.unwrap();

        let session = db.cash_sessions().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.closing_balance, Some(142000));
        assert_eq!(session.closed_by, Some(7));
        assert!(session.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_suggested_close_sums_cash_movements_since_open() {
        let db = test_db().await;
        let register = db.cash_register();
        let ledger = db.ledger();

        register.open(100000, 1).await.unwrap();

        for amount in [20000, 30000] {
            ledger
                .insert(&NewLedgerEntry {
                    entry_type: EntryType::Income,
                    amount,
                    description: None,
                    payment_method: Some(PaymentMethod::Cash),
                    created_by: Some(1),
                })
                .await
                .unwrap();
        }

        let summary = register.summary(None).await.unwrap();
        assert!(summary.has_open);
        assert_eq!(summary.opening, 100000);
        assert_eq!(summary.cash_income, 50000);
        assert_eq!(summary.cash_expense, 0);
        assert_eq!(summary.suggested_close, 150000);
    }

    #[tokio::test]
    async fn test_summary_ignores_non_cash_and_expense_reduces() {
        let db = test_db().await;
        let register = db.cash_register();
        let ledger = db.ledger();

        register.open(10000, 1).await.unwrap();

        ledger
            .insert(&NewLedgerEntry {
                entry_type: EntryType::Income,
                amount: 99000,
                description: None,
                payment_method: Some(PaymentMethod::Transfer),
                created_by: None,
            })
            .await
            .unwrap();
        ledger
            .insert(&NewLedgerEntry {
                entry_type: EntryType::Expense,
                amount: 4000,
                description: Some("ice".to_string()),
                payment_method: Some(PaymentMethod::Cash),
                created_by: None,
            })
            .await
            .unwrap();

        let summary = register.summary(None).await.unwrap();
        assert_eq!(summary.cash_income, 0);
        assert_eq!(summary.cash_expense, 4000);
        assert_eq!(summary.suggested_close, 6000);
    }

    #[tokio::test]
    async fn test_summary_with_nothing_open_reports_has_open_false() {
        let db = test_db().await;
        let summary = db.cash_register().summary(None).await.unwrap();
        assert_eq!(summary, RegisterSummary::default());
        assert!(!summary.has_open);
    }

    #[tokio::test]
    async fn test_summary_for_unknown_session_is_not_found() {
        let db = test_db().await;
        let err = db.cash_register().summary(Some(99)).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotFound {
                entity: "CashSession",
                ..
            }
        ));
    }
}

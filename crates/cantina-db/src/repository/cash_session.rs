//! # Cash Session Repository
//!
//! Read access to cash-drawer sessions.
//!
//! Opening and closing go through [`crate::engine::cash::CashRegister`],
//! which owns the single-open-session invariant; this repository serves
//! lookups and the back-office session listing.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::DbResult;
use cantina_core::{CashSession, SessionStatus};

/// Filters for listing cash sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    /// Inclusive lower bound on the open date (whole day).
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the open date (whole day).
    pub to: Option<NaiveDate>,
}

/// Repository for cash session database operations.
#[derive(Debug, Clone)]
pub struct CashSessionRepository {
    pool: SqlitePool,
}

const SESSION_COLUMNS: &str =
    "id, opened_by, opening_balance, closing_balance, status, opened_at, closed_at, closed_by";

impl CashSessionRepository {
    /// Creates a new CashSessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CashSessionRepository { pool }
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<CashSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE id = ?1");
        let session = sqlx::query_as::<_, CashSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Finds the most recently opened session that is still open.
    ///
    /// The schema allows at most one, but ordering keeps the query correct
    /// even against a database that predates the unique index.
    pub async fn latest_open(&self) -> DbResult<Option<CashSession>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions
             WHERE status = 'open' ORDER BY opened_at DESC, id DESC LIMIT 1"
        );
        let session = sqlx::query_as::<_, CashSession>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Lists sessions, newest first, honoring the given filters.
    pub async fn list(&self, filter: &SessionFilter) -> DbResult<Vec<CashSession>> {
        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE 1=1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.from.is_some() {
            sql.push_str(" AND opened_at >= ?");
        }
        if filter.to.is_some() {
            sql.push_str(" AND opened_at < ?");
        }
        sql.push_str(" ORDER BY opened_at DESC, id DESC");

        let mut query = sqlx::query_as::<_, CashSession>(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(from) = filter.from {
            query = query.bind(day_start(from));
        }
        if let Some(to) = filter.to {
            query = query.bind(day_start(to) + chrono::Duration::days(1));
        }

        let sessions = query.fetch_all(&self.pool).await?;
        Ok(sessions)
    }

    /// Counts open sessions (0 or 1 when the exclusivity invariant holds).
    pub async fn open_count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cash_sessions WHERE status = 'open'")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Midnight UTC at the start of the given day.
fn day_start(day: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    day.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

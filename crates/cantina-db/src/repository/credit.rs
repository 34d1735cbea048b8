//! # Credit Repository
//!
//! Read access to receivable/payable credits and their payment history.
//!
//! Creation, payments and status transitions go through
//! [`crate::engine::credit::CreditBook`]; the listing here derives the
//! payment standing (`paid_amount`, `balance`) from the payments table.

use sqlx::SqlitePool;

use crate::error::DbResult;
use cantina_core::{Credit, CreditPayment, CreditStanding, CreditStatus, CreditType};

/// Filters for listing credits.
#[derive(Debug, Clone, Default)]
pub struct CreditFilter {
    pub credit_type: Option<CreditType>,
    pub status: Option<CreditStatus>,
}

/// Repository for credit database operations.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Gets a credit by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Credit>> {
        let credit = sqlx::query_as::<_, Credit>(
            "SELECT id, type, description, party, total, status, due_date, created_at
             FROM credits WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credit)
    }

    /// Lists credits with their derived payment standing, newest first.
    pub async fn list(&self, filter: &CreditFilter) -> DbResult<Vec<CreditStanding>> {
        let mut sql = String::from(
            r#"
            SELECT c.id, c.type, c.description, c.party, c.total, c.status, c.due_date,
                   COALESCE(p.paid, 0) AS paid_amount,
                   c.total - COALESCE(p.paid, 0) AS balance
            FROM credits c
            LEFT JOIN (
                SELECT credit_id, SUM(amount) AS paid
                FROM credit_payments
                GROUP BY credit_id
            ) p ON c.id = p.credit_id
            WHERE 1=1
            "#,
        );
        if filter.credit_type.is_some() {
            sql.push_str(" AND c.type = ?");
        }
        if filter.status.is_some() {
            sql.push_str(" AND c.status = ?");
        }
        sql.push_str(" ORDER BY c.created_at DESC, c.id DESC");

        let mut query = sqlx::query_as::<_, CreditStanding>(&sql);
        if let Some(credit_type) = filter.credit_type {
            query = query.bind(credit_type);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }

        let credits = query.fetch_all(&self.pool).await?;
        Ok(credits)
    }

    /// Gets the payment history of a credit, oldest first.
    pub async fn payments(&self, credit_id: i64) -> DbResult<Vec<CreditPayment>> {
        let payments = sqlx::query_as::<_, CreditPayment>(
            "SELECT id, credit_id, amount, payment_method, created_at
             FROM credit_payments WHERE credit_id = ?1 ORDER BY id",
        )
        .bind(credit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sums payments made against a credit.
    pub async fn paid_total(&self, credit_id: i64) -> DbResult<i64> {
        let paid: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM credit_payments WHERE credit_id = ?1",
        )
        .bind(credit_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(paid)
    }
}

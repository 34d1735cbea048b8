//! # Sale Repository
//!
//! Read access to sales and sale items.
//!
//! Sales are only ever *written* by the sale engine, inside one atomic unit
//! of work (see [`crate::engine::sale`]); this repository serves lookups for
//! the API layer, reporting and tests.

use sqlx::SqlitePool;

use crate::error::DbResult;
use cantina_core::{Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, user_id, table_id, total, sale_type, payment_method,
                    status, idempotency_key, created_at
             FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items of a sale, in insertion order.
    pub async fn items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, quantity, price
             FROM sale_items WHERE sale_id = ?1 ORDER BY id",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Finds the pending sale of a table, if any.
    ///
    /// The pending-sale-per-table relationship is a query, never a stored
    /// pointer; this is the single source of truth for table occupancy.
    pub async fn pending_for_table(&self, table_id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, user_id, table_id, total, sale_type, payment_method,
                    status, idempotency_key, created_at
             FROM sales WHERE table_id = ?1 AND status = 'pending'
             ORDER BY id DESC LIMIT 1",
        )
        .bind(table_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Counts pending sales referencing a table (0 or 1 when the occupancy
    /// invariant holds).
    pub async fn pending_count_for_table(&self, table_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sales WHERE table_id = ?1 AND status = 'pending'",
        )
        .bind(table_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Finds a sale by its idempotency key.
    pub async fn find_by_idempotency_key(&self, key: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, user_id, table_id, total, sale_type, payment_method,
                    status, idempotency_key, created_at
             FROM sales WHERE idempotency_key = ?1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Counts all sales (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

//! # Table Repository
//!
//! Database operations for tables and their pending-order views.
//!
//! ## Derived Occupancy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tables.status is a cached reflection of pending-sale existence:       │
//! │                                                                         │
//! │    occupied  ⇔  exactly one sales row (status = 'pending') references  │
//! │                 the table                                               │
//! │                                                                         │
//! │  Only the sale engine mutates it, inside the same transaction that     │
//! │  creates or removes the pending sale. The queries here OBSERVE the     │
//! │  invariant (list_with_orders joins pending sales back onto tables).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cantina_core::{PendingOrderLine, Table, TableStatus, TableWithOrder};

/// Fields for inserting or updating a table.
#[derive(Debug, Clone)]
pub struct NewTable {
    pub name: String,
    /// "table" or "bar".
    pub kind: String,
    pub capacity: i64,
}

/// Repository for table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Lists all tables with their current pending-order aggregates.
    ///
    /// A free table reports a zero `current_total` and `item_count`.
    pub async fn list_with_orders(&self) -> DbResult<Vec<TableWithOrder>> {
        let rows = sqlx::query_as::<_, TableWithOrder>(
            r#"
            SELECT t.id, t.name, t.type, t.capacity, t.status,
                   COALESCE(s.total, 0) AS current_total,
                   COALESCE(si.item_count, 0) AS item_count
            FROM tables t
            LEFT JOIN (
                SELECT table_id, SUM(total) AS total
                FROM sales
                WHERE status = 'pending'
                GROUP BY table_id
            ) s ON t.id = s.table_id
            LEFT JOIN (
                SELECT s.table_id, SUM(si.quantity) AS item_count
                FROM sales s
                JOIN sale_items si ON s.id = si.sale_id
                WHERE s.status = 'pending'
                GROUP BY s.table_id
            ) si ON t.id = si.table_id
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists free tables, ordered by name (for the sale screen picker).
    pub async fn list_free(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            "SELECT id, name, type, capacity, status, created_at
             FROM tables WHERE status = 'free' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Gets a table by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            "SELECT id, name, type, capacity, status, created_at
             FROM tables WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Inserts a new table (initial status: free) and returns its id.
    pub async fn insert(&self, new: &NewTable) -> DbResult<i64> {
        debug!(name = %new.name, "Inserting table");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tables (name, type, capacity, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&new.name)
        .bind(&new.kind)
        .bind(new.capacity)
        .bind(TableStatus::Free)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates a table's name, kind and capacity.
    ///
    /// Status is deliberately NOT updatable here: occupancy belongs to the
    /// sale engine's transactions.
    pub async fn update(&self, id: i64, new: &NewTable) -> DbResult<u64> {
        debug!(id, "Updating table");

        let result = sqlx::query(
            "UPDATE tables SET name = ?2, type = ?3, capacity = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(&new.name)
        .bind(&new.kind)
        .bind(new.capacity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Table", id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a table.
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting table");

        let result = sqlx::query("DELETE FROM tables WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Fetches the current pending order of a table, as cart lines.
    ///
    /// Empty for a free table.
    pub async fn pending_order(&self, table_id: i64) -> DbResult<Vec<PendingOrderLine>> {
        let lines = sqlx::query_as::<_, PendingOrderLine>(
            r#"
            SELECT si.product_id AS id, p.name, si.price, si.quantity
            FROM sales s
            JOIN sale_items si ON s.id = si.sale_id
            JOIN products p ON si.product_id = p.id
            WHERE s.table_id = ?1 AND s.status = 'pending'
            ORDER BY si.id
            "#,
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn mesa(name: &str) -> NewTable {
        NewTable {
            name: name.to_string(),
            kind: "table".to_string(),
            capacity: 4,
        }
    }

    #[tokio::test]
    async fn test_insert_starts_free() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        let id = repo.insert(&mesa("Mesa 1")).await.unwrap();
        let table = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);
        assert_eq!(table.kind, "table");
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        repo.insert(&mesa("Mesa 1")).await.unwrap();
        let err = repo.insert(&mesa("Mesa 1")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_with_orders_free_table_is_zeroed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        repo.insert(&mesa("Mesa 1")).await.unwrap();
        let rows = repo.list_with_orders().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].current_total, 0);
        assert_eq!(rows[0].item_count, 0);
    }

    #[tokio::test]
    async fn test_pending_order_empty_for_free_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.tables();

        let id = repo.insert(&mesa("Mesa 1")).await.unwrap();
        assert!(repo.pending_order(id).await.unwrap().is_empty());
    }
}

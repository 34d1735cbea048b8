//! # Reports
//!
//! Advisory read-only aggregates for the dashboard.
//!
//! These computations never gate an operation; callers degrade to
//! zero-valued defaults on storage failure instead of propagating the error
//! (the route layer does exactly that).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::DbResult;
use cantina_core::LOW_STOCK_THRESHOLD;

/// Today's headline numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Sum of today's paid sale totals.
    pub total_sales: i64,
    /// Tables currently occupied.
    pub active_tables: i64,
    /// Products with stock below the low-stock threshold.
    pub low_stock_products: i64,
    /// Count of today's sales (any status).
    pub total_transactions: i64,
}

/// Reporting reader.
#[derive(Debug, Clone)]
pub struct Reports {
    pool: SqlitePool,
}

impl Reports {
    /// Creates a new Reports reader.
    pub fn new(pool: SqlitePool) -> Self {
        Reports { pool }
    }

    /// Computes the dashboard summary over the current UTC day.
    pub async fn dashboard_summary(&self) -> DbResult<DashboardSummary> {
        let day_start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let total_sales: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total), 0) FROM sales
             WHERE created_at >= ?1 AND status = 'paid'",
        )
        .bind(day_start)
        .fetch_one(&self.pool)
        .await?;

        let active_tables: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tables WHERE status = 'occupied'")
                .fetch_one(&self.pool)
                .await?;

        let low_stock_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock < ?1")
                .bind(LOW_STOCK_THRESHOLD)
                .fetch_one(&self.pool)
                .await?;

        let total_transactions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE created_at >= ?1")
                .bind(day_start)
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardSummary {
            total_sales,
            active_tables,
            low_stock_products,
            total_transactions,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ProcessSaleRequest, SaveOrderRequest};
    use crate::testutil::{seed_product, seed_table, test_db};
    use cantina_core::{OrderLine, PaymentMethod};

    #[tokio::test]
    async fn test_dashboard_summary_counts_today() {
        let db = test_db().await;
        let beer = seed_product(&db, "Cerveza Nacional", 8000, 50).await;
        seed_product(&db, "Cóctel Mojito", 23000, 0).await;
        let table_id = seed_table(&db, "Mesa 1").await;
        let engine = db.sale_engine();

        engine
            .process_sale(ProcessSaleRequest {
                items: vec![OrderLine {
                    product_id: beer,
                    quantity: 2,
                    price: 8000,
                }],
                table_id: None,
                payment_method: PaymentMethod::Cash,
                total: 16000,
                idempotency_key: None,
                created_by: 1,
            })
            .await
            .unwrap();

        engine
            .save_order(SaveOrderRequest {
                items: vec![OrderLine {
                    product_id: beer,
                    quantity: 1,
                    price: 8000,
                }],
                table_id: Some(table_id),
                payment_method: PaymentMethod::Cash,
                created_by: 1,
            })
            .await
            .unwrap();

        let summary = db.reports().dashboard_summary().await.unwrap();
        // Only the paid sale counts toward revenue; both sales count as
        // today's transactions.
        assert_eq!(summary.total_sales, 16000);
        assert_eq!(summary.active_tables, 1);
        assert_eq!(summary.low_stock_products, 1);
        assert_eq!(summary.total_transactions, 2);
    }

    #[tokio::test]
    async fn test_dashboard_summary_on_empty_store_is_zeroed() {
        let db = test_db().await;
        let summary = db.reports().dashboard_summary().await.unwrap();
        assert_eq!(summary, DashboardSummary::default());
    }
}

//! # Sale Transaction Engine
//!
//! Orchestrates the atomic multi-table mutations of sale processing:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_sale (one transaction)                                         │
//! │                                                                         │
//! │  1. idempotency-key lookup ── hit ──► {duplicate}, nothing written     │
//! │  2. empty items + table ────────────► clear table, {cleared}           │
//! │  3. supersede the table's pending sale (purge items + sale)            │
//! │  4. insert Sale (status = paid)                                        │
//! │  5. per line: decrement stock, insert SaleItem                         │
//! │  6. post ONE income ledger entry for the declared total                │
//! │  7. table involved? mark it free (payment ends its lifecycle)          │
//! │  8. commit                                                              │
//! │                                                                         │
//! │  Any failure in 3..7 rolls the whole unit back: no partial stock       │
//! │  decrement, no orphan ledger entry, no stale table status.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `save_order` maintains a table's draft (pending) order with the same
//! supersede-then-insert shape, but never touches inventory or the ledger.
//!
//! ## Concurrency
//! Conflicting writers are serialized by SQLite; the check-then-insert on
//! the idempotency key is backstopped by its unique index, so a concurrent
//! duplicate resolves to `{duplicate}` instead of a second sale.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, EngineError, EngineResult};
use cantina_core::validation::{validate_draft_lines, validate_non_negative_amount, validate_sale_lines};
use cantina_core::{
    normalize_lines, order_total, EntryType, OrderLine, PaymentMethod, SaleStatus, SaleType,
    TableStatus, ValidationError,
};

// =============================================================================
// Requests & Outcomes
// =============================================================================

/// A request to process (charge) a sale.
#[derive(Debug, Clone)]
pub struct ProcessSaleRequest {
    pub items: Vec<OrderLine>,
    /// None for a direct (walk-up) sale.
    pub table_id: Option<i64>,
    pub payment_method: PaymentMethod,
    /// The total the client declares it charged. Captured as-is into the
    /// sale and the ledger entry.
    pub total: i64,
    /// Client token for at-most-once processing across retries.
    pub idempotency_key: Option<String>,
    pub created_by: i64,
}

/// A request to save (not charge) a table's draft order.
#[derive(Debug, Clone)]
pub struct SaveOrderRequest {
    pub items: Vec<OrderLine>,
    pub table_id: Option<i64>,
    pub payment_method: PaymentMethod,
    pub created_by: i64,
}

/// Outcome of [`SaleEngine::process_sale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleOutcome {
    /// The sale was charged; stock, ledger and table state are updated.
    Processed { sale_id: i64 },
    /// Empty order against a table: the table was cleared instead.
    Cleared,
    /// The idempotency key was already processed; nothing was written.
    Duplicate,
}

/// Outcome of [`SaleEngine::save_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// A pending sale now holds the table's draft order.
    Saved { sale_id: i64 },
    /// The normalized order was empty: the table was cleared.
    Cleared,
}

// =============================================================================
// Engine
// =============================================================================

/// The sale transaction engine.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    /// Creates a new SaleEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Processes a sale: charge, decrement stock, post income, settle the
    /// table. All inside one atomic unit of work.
    pub async fn process_sale(&self, req: ProcessSaleRequest) -> EngineResult<SaleOutcome> {
        validate_sale_lines(&req.items)?;
        validate_non_negative_amount("total", req.total)?;

        debug!(
            table_id = ?req.table_id,
            items = req.items.len(),
            total = req.total,
            "Processing sale"
        );

        let mut tx = self.pool.begin().await?;

        // At-most-once: a key we have already seen means the client is
        // retrying a sale whose side effects are already applied.
        if let Some(key) = &req.idempotency_key {
            let existing: Option<(i64,)> =
                sqlx::query_as("SELECT id FROM sales WHERE idempotency_key = ?1")
                    .bind(key)
                    .fetch_optional(&mut *tx)
                    .await?;
            if let Some((sale_id,)) = existing {
                debug!(sale_id, "Idempotency key already processed");
                return Ok(SaleOutcome::Duplicate);
            }
        }

        // Resolve the table up front: a missing table aborts before any
        // write, and the name feeds the ledger description.
        let table = match req.table_id {
            Some(id) => Some((id, fetch_table_name(&mut tx, id).await?)),
            None => None,
        };

        if req.items.is_empty() {
            // "Pay an empty order" against a table is a clear action.
            return match &table {
                Some((table_id, _)) => {
                    purge_pending(&mut tx, *table_id).await?;
                    set_table_status(&mut tx, *table_id, TableStatus::Free).await?;
                    tx.commit().await?;
                    info!(table_id, "Table cleared");
                    Ok(SaleOutcome::Cleared)
                }
                None => Err(ValidationError::EmptyOrder.into()),
            };
        }

        // "Pay what's currently on the table": the new paid sale replaces
        // any pending draft, it does not append to it.
        if let Some((table_id, _)) = &table {
            purge_pending(&mut tx, *table_id).await?;
        }

        let sale_type = if table.is_some() {
            SaleType::Table
        } else {
            SaleType::Direct
        };
        let now = Utc::now();

        let inserted = sqlx::query(
            "INSERT INTO sales (user_id, table_id, total, sale_type, payment_method, status, idempotency_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(req.created_by)
        .bind(req.table_id)
        .bind(req.total)
        .bind(sale_type)
        .bind(req.payment_method)
        .bind(SaleStatus::Paid)
        .bind(&req.idempotency_key)
        .bind(now)
        .execute(&mut *tx)
        .await;

        let sale_id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(e) => {
                let db_err = DbError::from(e);
                // A concurrent request with the same key committed between
                // our lookup and this insert. The unique index makes the
                // race lose cleanly: report duplicate, roll back.
                if db_err.is_unique_violation_on("idempotency_key") {
                    return Ok(SaleOutcome::Duplicate);
                }
                return Err(db_err.into());
            }
        };

        for line in &req.items {
            // Stock may go negative under concurrent overdraw; a zero row
            // count means the product itself is gone.
            let hit = sqlx::query("UPDATE products SET stock = stock - ?1 WHERE id = ?2")
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;
            if hit.rows_affected() == 0 {
                return Err(EngineError::NotFound {
                    entity: "Product",
                    id: line.product_id,
                });
            }

            sqlx::query(
                "INSERT INTO sale_items (sale_id, product_id, quantity, price)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        let description = match &table {
            Some((_, name)) => format!("Sale #{sale_id} (table {name})"),
            None => format!("Sale #{sale_id} (direct sale)"),
        };
        sqlx::query(
            "INSERT INTO transactions (type, amount, description, payment_method, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(EntryType::Income)
        .bind(req.total)
        .bind(&description)
        .bind(req.payment_method)
        .bind(req.created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Payment finishes the table's lifecycle.
        if let Some((table_id, _)) = &table {
            set_table_status(&mut tx, *table_id, TableStatus::Free).await?;
        }

        tx.commit().await?;

        info!(
            sale_id,
            total = req.total,
            items = req.items.len(),
            table_id = ?req.table_id,
            "Sale processed"
        );

        Ok(SaleOutcome::Processed { sale_id })
    }

    /// Saves a table's draft order (or clears it), never touching inventory
    /// or the ledger.
    pub async fn save_order(&self, req: SaveOrderRequest) -> EngineResult<OrderOutcome> {
        validate_draft_lines(&req.items)?;

        let lines = normalize_lines(&req.items);
        let total = order_total(&lines);

        debug!(
            table_id = ?req.table_id,
            lines = lines.len(),
            total,
            "Saving order"
        );

        let mut tx = self.pool.begin().await?;

        let table = match req.table_id {
            Some(id) => {
                fetch_table_name(&mut tx, id).await?;
                Some(id)
            }
            None => None,
        };

        // Supersede: the saved draft replaces whatever was pending.
        if let Some(table_id) = table {
            purge_pending(&mut tx, table_id).await?;
        }

        if lines.is_empty() || total <= 0 {
            // Clear-cart path: free the table and store no sale.
            return match table {
                Some(table_id) => {
                    set_table_status(&mut tx, table_id, TableStatus::Free).await?;
                    tx.commit().await?;
                    info!(table_id, "Order cleared");
                    Ok(OrderOutcome::Cleared)
                }
                None => Err(ValidationError::EmptyOrder.into()),
            };
        }

        let sale_type = if table.is_some() {
            SaleType::Table
        } else {
            SaleType::Direct
        };
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO sales (user_id, table_id, total, sale_type, payment_method, status, idempotency_key, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
        )
        .bind(req.created_by)
        .bind(req.table_id)
        .bind(total)
        .bind(sale_type)
        .bind(req.payment_method)
        .bind(SaleStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let sale_id = result.last_insert_rowid();

        for line in &lines {
            sqlx::query(
                "INSERT INTO sale_items (sale_id, product_id, quantity, price)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(table_id) = table {
            set_table_status(&mut tx, table_id, TableStatus::Occupied).await?;
        }

        tx.commit().await?;

        info!(sale_id, total, table_id = ?req.table_id, "Order saved");

        Ok(OrderOutcome::Saved { sale_id })
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

/// Resolves a table's name, or fails the unit with NotFound.
async fn fetch_table_name(conn: &mut SqliteConnection, table_id: i64) -> EngineResult<String> {
    let row: Option<(String,)> = sqlx::query_as("SELECT name FROM tables WHERE id = ?1")
        .bind(table_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some((name,)) => Ok(name),
        None => Err(EngineError::NotFound {
            entity: "Table",
            id: table_id,
        }),
    }
}

/// Removes the table's pending sale and its items, if any.
async fn purge_pending(conn: &mut SqliteConnection, table_id: i64) -> EngineResult<()> {
    sqlx::query(
        "DELETE FROM sale_items WHERE sale_id IN
         (SELECT id FROM sales WHERE table_id = ?1 AND status = 'pending')",
    )
    .bind(table_id)
    .execute(&mut *conn)
    .await?;

    sqlx::query("DELETE FROM sales WHERE table_id = ?1 AND status = 'pending'")
        .bind(table_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Updates a table's cached occupancy status inside the current unit.
async fn set_table_status(
    conn: &mut SqliteConnection,
    table_id: i64,
    status: TableStatus,
) -> EngineResult<()> {
    let hit = sqlx::query("UPDATE tables SET status = ?2 WHERE id = ?1")
        .bind(table_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;

    if hit.rows_affected() == 0 {
        return Err(EngineError::NotFound {
            entity: "Table",
            id: table_id,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_product, seed_table, test_db};
    use cantina_core::generate_idempotency_key;

    fn line(product_id: i64, quantity: i64, price: i64) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
            price,
        }
    }

    fn process_req(items: Vec<OrderLine>, table_id: Option<i64>, total: i64) -> ProcessSaleRequest {
        ProcessSaleRequest {
            items,
            table_id,
            payment_method: PaymentMethod::Cash,
            total,
            idempotency_key: None,
            created_by: 1,
        }
    }

    fn save_req(items: Vec<OrderLine>, table_id: Option<i64>) -> SaveOrderRequest {
        SaveOrderRequest {
            items,
            table_id,
            payment_method: PaymentMethod::Cash,
            created_by: 1,
        }
    }

    #[tokio::test]
    async fn test_direct_sale_decrements_stock_and_posts_income() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Cerveza Nacional", 8000, 50).await;

        let outcome = db
            .sale_engine()
            .process_sale(process_req(vec![line(product_id, 2, 8000)], None, 16000))
            .await
            .unwrap();

        let SaleOutcome::Processed { sale_id } = outcome else {
            panic!("expected Processed, got {outcome:?}");
        };

        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 48);

        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Paid);
        assert_eq!(sale.sale_type, SaleType::Direct);
        assert_eq!(sale.total, 16000);

        let entries = db
            .ledger()
            .list(&crate::repository::ledger::LedgerFilter::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Income);
        assert_eq!(entries[0].amount, 16000);
    }

    #[tokio::test]
    async fn test_same_idempotency_key_processes_at_most_once() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Ron", 90000, 25).await;
        let engine = db.sale_engine();

        let key = generate_idempotency_key();
        let mut req = process_req(vec![line(product_id, 1, 90000)], None, 90000);
        req.idempotency_key = Some(key.clone());

        let first = engine.process_sale(req.clone()).await.unwrap();
        assert!(matches!(first, SaleOutcome::Processed { .. }));

        let second = engine.process_sale(req).await.unwrap();
        assert_eq!(second, SaleOutcome::Duplicate);

        // Exactly one sale, one ledger entry, one stock decrement.
        assert_eq!(db.sales().count().await.unwrap(), 1);
        assert_eq!(db.ledger().count().await.unwrap(), 1);
        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 24);

        let sale = db
            .sales()
            .find_by_idempotency_key(&key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.total, 90000);
    }

    #[tokio::test]
    async fn test_table_sale_supersedes_pending_and_frees_table() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Vodka", 85000, 20).await;
        let table_id = seed_table(&db, "Mesa 1").await;
        let engine = db.sale_engine();

        engine
            .save_order(save_req(vec![line(product_id, 3, 85000)], Some(table_id)))
            .await
            .unwrap();
        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        let outcome = engine
            .process_sale(process_req(
                vec![line(product_id, 3, 85000)],
                Some(table_id),
                255000,
            ))
            .await
            .unwrap();
        assert!(matches!(outcome, SaleOutcome::Processed { .. }));

        // Payment superseded the draft and ended the table's lifecycle.
        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);
        assert_eq!(
            db.sales().pending_count_for_table(table_id).await.unwrap(),
            0
        );
        assert_eq!(db.sales().count().await.unwrap(), 1);

        // Stock was decremented once, by the paid sale only.
        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 17);
    }

    #[tokio::test]
    async fn test_empty_items_with_table_clears_it() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Tequila", 95000, 18).await;
        let table_id = seed_table(&db, "Mesa 2").await;
        let engine = db.sale_engine();

        engine
            .save_order(save_req(vec![line(product_id, 2, 95000)], Some(table_id)))
            .await
            .unwrap();

        let outcome = engine
            .process_sale(process_req(vec![], Some(table_id), 0))
            .await
            .unwrap();
        assert_eq!(outcome, SaleOutcome::Cleared);

        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);
        assert_eq!(
            db.sales().pending_count_for_table(table_id).await.unwrap(),
            0
        );
        // No ledger entry, no stock change.
        assert_eq!(db.ledger().count().await.unwrap(), 0);
        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 18);
    }

    #[tokio::test]
    async fn test_empty_direct_sale_is_rejected() {
        let db = test_db().await;
        let err = db
            .sale_engine()
            .process_sale(process_req(vec![], None, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_sale_rolls_back_every_write() {
        let db = test_db().await;
        let good = seed_product(&db, "Cerveza Importada", 12000, 30).await;
        let table_id = seed_table(&db, "Mesa 3").await;
        let engine = db.sale_engine();

        engine
            .save_order(save_req(vec![line(good, 1, 12000)], Some(table_id)))
            .await
            .unwrap();

        // Second line references a product that does not exist: the unit
        // must abort after the first line's stock decrement.
        let err = engine
            .process_sale(process_req(
                vec![line(good, 2, 12000), line(9999, 1, 5000)],
                Some(table_id),
                29000,
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NotFound {
                entity: "Product",
                ..
            }
        ));

        // Full rollback: stock intact, no paid sale, no ledger entry, the
        // superseded draft restored, table still occupied.
        let product = db.products().get_by_id(good).await.unwrap().unwrap();
        assert_eq!(product.stock, 30);
        assert_eq!(db.sales().count().await.unwrap(), 1);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
        assert_eq!(
            db.sales().pending_count_for_table(table_id).await.unwrap(),
            1
        );
        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn test_process_sale_on_missing_table_writes_nothing() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Vino Tinto", 35000, 20).await;

        let err = db
            .sale_engine()
            .process_sale(process_req(
                vec![line(product_id, 1, 35000)],
                Some(42),
                35000,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: "Table", .. }));

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 20);
    }

    #[tokio::test]
    async fn test_stock_may_go_negative_on_overdraw() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Whisky", 120000, 1).await;

        db.sale_engine()
            .process_sale(process_req(vec![line(product_id, 5, 120000)], None, 600000))
            .await
            .unwrap();

        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, -4);
    }

    #[tokio::test]
    async fn test_invalid_lines_are_rejected_before_any_write() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Cerveza Nacional", 8000, 50).await;
        let engine = db.sale_engine();

        let err = engine
            .process_sale(process_req(vec![line(product_id, 0, 8000)], None, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = engine
            .process_sale(process_req(vec![line(product_id, 1, -10)], None, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_order_marks_table_occupied_and_computes_total() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Cerveza Nacional", 8000, 50).await;
        let table_id = seed_table(&db, "Mesa 4").await;

        let outcome = db
            .sale_engine()
            .save_order(save_req(
                vec![line(product_id, 2, 8000), line(product_id, 0, 8000)],
                Some(table_id),
            ))
            .await
            .unwrap();
        let OrderOutcome::Saved { sale_id } = outcome else {
            panic!("expected Saved, got {outcome:?}");
        };

        // Zero-quantity line dropped; total recomputed from the lines.
        let sale = db.sales().get_by_id(sale_id).await.unwrap().unwrap();
        assert_eq!(sale.status, SaleStatus::Pending);
        assert_eq!(sale.total, 16000);
        assert_eq!(db.sales().items(sale_id).await.unwrap().len(), 1);

        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        // No inventory or ledger side effects from a draft.
        assert_eq!(db.ledger().count().await.unwrap(), 0);
        let product = db.products().get_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 50);
    }

    #[tokio::test]
    async fn test_save_order_replaces_previous_draft() {
        let db = test_db().await;
        let beer = seed_product(&db, "Cerveza Nacional", 8000, 50).await;
        let rum = seed_product(&db, "Ron", 90000, 25).await;
        let table_id = seed_table(&db, "Mesa 5").await;
        let engine = db.sale_engine();

        engine
            .save_order(save_req(vec![line(beer, 2, 8000)], Some(table_id)))
            .await
            .unwrap();
        engine
            .save_order(save_req(vec![line(rum, 1, 90000)], Some(table_id)))
            .await
            .unwrap();

        assert_eq!(
            db.sales().pending_count_for_table(table_id).await.unwrap(),
            1
        );
        let pending = db
            .sales()
            .pending_for_table(table_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.total, 90000);

        let lines = db.tables().pending_order(table_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, rum);
        assert_eq!(lines[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_save_order_with_all_lines_zeroed_clears_table() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Cerveza Nacional", 8000, 50).await;
        let table_id = seed_table(&db, "Mesa 6").await;
        let engine = db.sale_engine();

        engine
            .save_order(save_req(vec![line(product_id, 2, 8000)], Some(table_id)))
            .await
            .unwrap();

        let outcome = engine
            .save_order(save_req(vec![line(product_id, 0, 8000)], Some(table_id)))
            .await
            .unwrap();
        assert_eq!(outcome, OrderOutcome::Cleared);

        let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);
        assert_eq!(
            db.sales().pending_count_for_table(table_id).await.unwrap(),
            0
        );
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_order_direct_with_no_items_is_rejected() {
        let db = test_db().await;
        let err = db
            .sale_engine()
            .save_order(save_req(vec![], None))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    /// Table invariant: `status == occupied` iff a pending sale references
    /// the table, after any sequence of save/process/clear calls.
    #[tokio::test]
    async fn test_occupancy_matches_pending_sales_across_sequences() {
        let db = test_db().await;
        let beer = seed_product(&db, "Cerveza Nacional", 8000, 500).await;
        let t1 = seed_table(&db, "Mesa 1").await;
        let t2 = seed_table(&db, "Mesa 2").await;
        let engine = db.sale_engine();

        let assert_invariant = |db: crate::pool::Database| async move {
            for table_id in [t1, t2] {
                let table = db.tables().get_by_id(table_id).await.unwrap().unwrap();
                let pending = db.sales().pending_count_for_table(table_id).await.unwrap();
                match table.status {
                    TableStatus::Occupied => assert_eq!(pending, 1, "table {table_id}"),
                    TableStatus::Free => assert_eq!(pending, 0, "table {table_id}"),
                }
            }
        };

        engine
            .save_order(save_req(vec![line(beer, 1, 8000)], Some(t1)))
            .await
            .unwrap();
        assert_invariant(db.clone()).await;

        engine
            .save_order(save_req(vec![line(beer, 4, 8000)], Some(t1)))
            .await
            .unwrap();
        engine
            .save_order(save_req(vec![line(beer, 2, 8000)], Some(t2)))
            .await
            .unwrap();
        assert_invariant(db.clone()).await;

        engine
            .process_sale(process_req(vec![line(beer, 4, 8000)], Some(t1), 32000))
            .await
            .unwrap();
        assert_invariant(db.clone()).await;

        engine
            .process_sale(process_req(vec![], Some(t2), 0))
            .await
            .unwrap();
        assert_invariant(db.clone()).await;

        // Re-clearing a free table is an idempotent no-op.
        engine
            .process_sale(process_req(vec![], Some(t2), 0))
            .await
            .unwrap();
        assert_invariant(db).await;
    }
}

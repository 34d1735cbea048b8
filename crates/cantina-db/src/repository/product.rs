//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Stock is only *decremented* by the sale engine (inside its transaction);
//! this repository handles catalog maintenance and restocking.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use cantina_core::Product;

/// Fields for inserting or updating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category: String,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    ///
    /// With `for_sale`, only products with positive stock are returned
    /// (the sale screen hides sold-out items).
    pub async fn list(&self, for_sale: bool) -> DbResult<Vec<Product>> {
        let sql = if for_sale {
            "SELECT id, name, price, stock, category, created_at
             FROM products WHERE stock > 0 ORDER BY name"
        } else {
            "SELECT id, name, price, stock, category, created_at
             FROM products ORDER BY name"
        };

        let products = sqlx::query_as::<_, Product>(sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, category, created_at
             FROM products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product and returns its generated id.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<i64> {
        debug!(name = %new.name, "Inserting product");

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO products (name, price, stock, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.category)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Updates an existing product.
    pub async fn update(&self, id: i64, new: &NewProduct) -> DbResult<u64> {
        debug!(id, "Updating product");

        let result = sqlx::query(
            "UPDATE products SET name = ?2, price = ?3, stock = ?4, category = ?5
             WHERE id = ?1",
        )
        .bind(id)
        .bind(&new.name)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.category)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(result.rows_affected())
    }

    /// Deletes a product.
    ///
    /// Fails with a foreign-key violation when historical sale lines still
    /// reference the product (RESTRICT on `sale_items.product_id`).
    pub async fn delete(&self, id: i64) -> DbResult<u64> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Adjusts stock by a delta (positive for restocking).
    pub async fn adjust_stock(&self, id: i64, delta: i64) -> DbResult<()> {
        debug!(id, delta, "Adjusting stock");

        let result = sqlx::query("UPDATE products SET stock = stock + ?2 WHERE id = ?1")
            .bind(id)
            .bind(delta)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products with stock below the given threshold.
    pub async fn count_low_stock(&self, threshold: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock < ?1")
            .bind(threshold)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> ProductRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
    }

    fn cerveza() -> NewProduct {
        NewProduct {
            name: "Cerveza Nacional".to_string(),
            price: 8000,
            stock: 50,
            category: "bebidas".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let id = repo.insert(&cerveza()).await.unwrap();

        let product = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(product.name, "Cerveza Nacional");
        assert_eq!(product.price, 8000);
        assert_eq!(product.stock, 50);
    }

    #[tokio::test]
    async fn test_list_for_sale_hides_sold_out() {
        let repo = repo().await;
        repo.insert(&cerveza()).await.unwrap();
        repo.insert(&NewProduct {
            name: "Cóctel Mojito".to_string(),
            price: 23000,
            stock: 0,
            category: "cocteles".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(repo.list(false).await.unwrap().len(), 2);
        let for_sale = repo.list(true).await.unwrap();
        assert_eq!(for_sale.len(), 1);
        assert_eq!(for_sale[0].name, "Cerveza Nacional");
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = repo().await;
        let err = repo.update(999, &cerveza()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let repo = repo().await;
        let id = repo.insert(&cerveza()).await.unwrap();

        repo.adjust_stock(id, 10).await.unwrap();
        assert_eq!(repo.get_by_id(id).await.unwrap().unwrap().stock, 60);
    }

    #[tokio::test]
    async fn test_count_low_stock() {
        let repo = repo().await;
        repo.insert(&cerveza()).await.unwrap();
        repo.insert(&NewProduct {
            name: "Whisky".to_string(),
            price: 120000,
            stock: 3,
            category: "licores".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(repo.count_low_stock(10).await.unwrap(), 1);
    }
}

//! Shared helpers for cantina-db tests: an in-memory database plus seed
//! data shaped like the real catalog.

use crate::pool::{Database, DbConfig};
use crate::repository::product::NewProduct;
use crate::repository::table::NewTable;

/// Fresh migrated in-memory database.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Inserts a product and returns its id.
pub async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> i64 {
    db.products()
        .insert(&NewProduct {
            name: name.to_string(),
            price,
            stock,
            category: "bebidas".to_string(),
        })
        .await
        .unwrap()
}

/// Inserts a free table and returns its id.
pub async fn seed_table(db: &Database, name: &str) -> i64 {
    db.tables()
        .insert(&NewTable {
            name: name.to_string(),
            kind: "table".to_string(),
            capacity: 4,
        })
        .await
        .unwrap()
}

//! # API Routes
//!
//! Route table and shared response shapes. Handlers live in per-resource
//! modules; all state is the shared [`Database`] handle.

pub mod cash;
pub mod credits;
pub mod dashboard;
pub mod products;
pub mod sales;
pub mod tables;
pub mod transactions;

use axum::routing::{get, post, put};
use axum::Router;
use serde::Serialize;

use cantina_db::Database;

/// Builds the full API router.
pub fn router(db: Database) -> Router {
    Router::new()
        .route("/api/dashboard/summary", get(dashboard::summary))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route("/api/tables", get(tables::list).post(tables::create))
        .route("/api/tables/free", get(tables::list_free))
        .route(
            "/api/tables/{id}",
            put(tables::update).delete(tables::remove),
        )
        .route("/api/tables/{id}/order", get(tables::order))
        .route("/api/sales/process", post(sales::process))
        .route("/api/sales/save", post(sales::save))
        .route("/api/transactions", get(transactions::list))
        .route("/api/transactions/income", post(transactions::income))
        .route("/api/transactions/expense", post(transactions::expense))
        .route("/api/cash/summary", get(cash::summary))
        .route("/api/cash/open", post(cash::open))
        .route("/api/cash/close", post(cash::close))
        .route("/api/cash/sessions", get(cash::sessions))
        .route("/api/credits", get(credits::list).post(credits::create))
        .route("/api/credits/{id}/payments", post(credits::add_payment))
        .route("/api/credits/{id}/status", put(credits::set_status))
        .with_state(db)
}

/// `{ "success": true, "id": N }` - returned by create endpoints.
#[derive(Debug, Serialize)]
pub struct Created {
    pub success: bool,
    pub id: i64,
}

impl Created {
    pub fn new(id: i64) -> Self {
        Created { success: true, id }
    }
}

/// `{ "success": true, "changes": N }` - returned by update/delete endpoints.
#[derive(Debug, Serialize)]
pub struct Changed {
    pub success: bool,
    pub changes: u64,
}

impl Changed {
    pub fn new(changes: u64) -> Self {
        Changed {
            success: true,
            changes,
        }
    }
}

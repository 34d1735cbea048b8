//! # Ledger Routes
//!
//! Filtered listing plus manual income/expense postings (administrative
//! entries outside the sale flow).

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::Created;
use cantina_core::validation::validate_positive_amount;
use cantina_core::{EntryType, LedgerEntry, PaymentMethod};
use cantina_db::{Database, LedgerFilter, NewLedgerEntry};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default, rename = "type")]
    pub entry_type: Option<EntryType>,
    #[serde(default)]
    pub payment: Option<PaymentMethod>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct EntryPayload {
    pub description: String,
    pub amount: i64,
    #[serde(default, rename = "payment_method", alias = "paymentMethod")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default = "default_user", rename = "user_id", alias = "userId")]
    pub user_id: i64,
}

fn default_user() -> i64 {
    1
}

/// `GET /api/transactions`
pub async fn list(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LedgerEntry>>, ApiError> {
    let entries = db
        .ledger()
        .list(&LedgerFilter {
            entry_type: query.entry_type,
            payment_method: query.payment,
            from: query.from,
            to: query.to,
        })
        .await?;
    Ok(Json(entries))
}

/// `POST /api/transactions/income`
pub async fn income(
    State(db): State<Database>,
    Json(body): Json<EntryPayload>,
) -> Result<Json<Created>, ApiError> {
    post_entry(&db, EntryType::Income, body).await
}

/// `POST /api/transactions/expense`
pub async fn expense(
    State(db): State<Database>,
    Json(body): Json<EntryPayload>,
) -> Result<Json<Created>, ApiError> {
    post_entry(&db, EntryType::Expense, body).await
}

async fn post_entry(
    db: &Database,
    entry_type: EntryType,
    body: EntryPayload,
) -> Result<Json<Created>, ApiError> {
    validate_positive_amount("amount", body.amount)
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let id = db
        .ledger()
        .insert(&NewLedgerEntry {
            entry_type,
            amount: body.amount,
            description: Some(body.description),
            payment_method: body.payment_method,
            created_by: Some(body.user_id),
        })
        .await?;

    Ok(Json(Created::new(id)))
}

//! # Credit Routes

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::Created;
use cantina_core::{CreditStanding, CreditStatus, CreditType, PaymentMethod};
use cantina_db::{CreditFilter, Database, NewCredit};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default, rename = "type")]
    pub credit_type: Option<CreditType>,
    #[serde(default)]
    pub status: Option<CreditStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    #[serde(rename = "type")]
    pub credit_type: CreditType,
    pub description: String,
    pub party: String,
    pub total: i64,
    #[serde(default, rename = "due_date", alias = "dueDate")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentPayload {
    pub amount: i64,
    #[serde(
        default = "default_payment_method",
        rename = "payment_method",
        alias = "paymentMethod"
    )]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: CreditStatus,
    #[serde(default = "default_user", rename = "created_by", alias = "createdBy")]
    pub created_by: i64,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

fn default_user() -> i64 {
    1
}

/// Success shape of a status transition; `transactionId` is present only
/// when the close posted a ledger entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub changes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
}

/// `GET /api/credits`
pub async fn list(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CreditStanding>>, ApiError> {
    let credits = db
        .credits()
        .list(&CreditFilter {
            credit_type: query.credit_type,
            status: query.status,
        })
        .await?;
    Ok(Json(credits))
}

/// `POST /api/credits`
pub async fn create(
    State(db): State<Database>,
    Json(body): Json<CreatePayload>,
) -> Result<Json<Created>, ApiError> {
    let id = db
        .credit_book()
        .create(&NewCredit {
            credit_type: body.credit_type,
            description: body.description,
            party: body.party,
            total: body.total,
            due_date: body.due_date,
        })
        .await?;
    Ok(Json(Created::new(id)))
}

/// `POST /api/credits/{id}/payments`
pub async fn add_payment(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(body): Json<PaymentPayload>,
) -> Result<Json<Created>, ApiError> {
    let payment_id = db
        .credit_book()
        .add_payment(id, body.amount, body.payment_method)
        .await?;
    Ok(Json(Created::new(payment_id)))
}

/// `PUT /api/credits/{id}/status`
pub async fn set_status(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(body): Json<StatusPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    let change = db
        .credit_book()
        .set_status(id, body.status, body.created_by)
        .await?;
    Ok(Json(StatusResponse {
        success: true,
        changes: change.changes,
        transaction_id: change.ledger_entry_id,
    }))
}

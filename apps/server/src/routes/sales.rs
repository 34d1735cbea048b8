//! # Sale Routes
//!
//! The two entry points of the sale transaction engine:
//! `POST /api/sales/process` (charge) and `POST /api/sales/save` (draft).
//!
//! Clients queue failed `process` submissions for replay; the idempotency
//! key makes that replay safe.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use cantina_core::{OrderLine, PaymentMethod};
use cantina_db::{
    Database, OrderOutcome, ProcessSaleRequest, SaleOutcome, SaveOrderRequest,
};

/// Body of a sale submission. Field names follow the frontend cart payload
/// (camelCase `tableId`, snake_case `payment_method`); aliases accept both.
#[derive(Debug, Deserialize)]
pub struct SaleSubmission {
    #[serde(default)]
    pub items: Vec<OrderLine>,

    #[serde(default, rename = "tableId", alias = "table_id")]
    pub table_id: Option<i64>,

    #[serde(
        default = "default_payment_method",
        rename = "payment_method",
        alias = "paymentMethod"
    )]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub total: i64,

    #[serde(default, rename = "idempotency_key", alias = "idempotencyKey")]
    pub idempotency_key: Option<String>,

    #[serde(default = "default_user", rename = "user_id", alias = "userId")]
    pub user_id: i64,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Cash
}

fn default_user() -> i64 {
    1
}

/// Discriminated success shape of both sale endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<bool>,
}

impl SaleResponse {
    fn processed(sale_id: i64) -> Self {
        SaleResponse {
            success: true,
            sale_id: Some(sale_id),
            cleared: None,
            duplicate: None,
        }
    }

    fn cleared() -> Self {
        SaleResponse {
            success: true,
            sale_id: None,
            cleared: Some(true),
            duplicate: None,
        }
    }

    fn duplicate() -> Self {
        SaleResponse {
            success: true,
            sale_id: None,
            cleared: None,
            duplicate: Some(true),
        }
    }
}

/// `POST /api/sales/process`
pub async fn process(
    State(db): State<Database>,
    Json(body): Json<SaleSubmission>,
) -> Result<Json<SaleResponse>, ApiError> {
    let outcome = db
        .sale_engine()
        .process_sale(ProcessSaleRequest {
            items: body.items,
            table_id: body.table_id,
            payment_method: body.payment_method,
            total: body.total,
            idempotency_key: body.idempotency_key,
            created_by: body.user_id,
        })
        .await?;

    Ok(Json(match outcome {
        SaleOutcome::Processed { sale_id } => SaleResponse::processed(sale_id),
        SaleOutcome::Cleared => SaleResponse::cleared(),
        SaleOutcome::Duplicate => SaleResponse::duplicate(),
    }))
}

/// `POST /api/sales/save`
pub async fn save(
    State(db): State<Database>,
    Json(body): Json<SaleSubmission>,
) -> Result<Json<SaleResponse>, ApiError> {
    let outcome = db
        .sale_engine()
        .save_order(SaveOrderRequest {
            items: body.items,
            table_id: body.table_id,
            payment_method: body.payment_method,
            created_by: body.user_id,
        })
        .await?;

    Ok(Json(match outcome {
        OrderOutcome::Saved { sale_id } => SaleResponse::processed(sale_id),
        OrderOutcome::Cleared => SaleResponse::cleared(),
    }))
}

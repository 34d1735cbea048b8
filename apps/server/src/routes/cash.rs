//! # Cash Session Routes
//!
//! Open/close carry the exact conflict messages the frontend matches on;
//! the summary endpoint is advisory and degrades to zeros on storage
//! failure rather than erroring.

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::error::ApiError;
use crate::routes::{Changed, Created};
use cantina_core::{CashSession, SessionStatus};
use cantina_db::{Database, EngineError, RegisterSummary, SessionFilter};

#[derive(Debug, Deserialize)]
pub struct OpenPayload {
    #[serde(rename = "opening_balance", alias = "openingBalance")]
    pub opening_balance: i64,
    #[serde(default = "default_user", rename = "user_id", alias = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClosePayload {
    #[serde(rename = "closing_balance", alias = "closingBalance")]
    pub closing_balance: i64,
    #[serde(default = "default_user", rename = "user_id", alias = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default, rename = "session_id", alias = "sessionId")]
    pub session_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

fn default_user() -> i64 {
    1
}

/// `POST /api/cash/open`
pub async fn open(
    State(db): State<Database>,
    Json(body): Json<OpenPayload>,
) -> Result<Json<Created>, ApiError> {
    let id = db
        .cash_register()
        .open(body.opening_balance, body.user_id)
        .await?;
    Ok(Json(Created::new(id)))
}

/// `POST /api/cash/close`
pub async fn close(
    State(db): State<Database>,
    Json(body): Json<ClosePayload>,
) -> Result<Json<Changed>, ApiError> {
    let changes = db
        .cash_register()
        .close(body.closing_balance, body.user_id)
        .await?;
    Ok(Json(Changed::new(changes)))
}

/// `GET /api/cash/summary` - suggested closing balance for the open (or a
/// named) session.
pub async fn summary(
    State(db): State<Database>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<RegisterSummary>, ApiError> {
    match db.cash_register().summary(query.session_id).await {
        Ok(summary) => Ok(Json(summary)),
        // Advisory read: zero-valued defaults instead of a hard failure.
        Err(EngineError::Storage(err)) => {
            warn!(error = %err, "Cash summary degraded to defaults");
            Ok(Json(RegisterSummary::default()))
        }
        Err(other) => Err(other.into()),
    }
}

/// `GET /api/cash/sessions`
pub async fn sessions(
    State(db): State<Database>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<CashSession>>, ApiError> {
    let sessions = db
        .cash_sessions()
        .list(&SessionFilter {
            status: query.status,
            from: query.from,
            to: query.to,
        })
        .await?;
    Ok(Json(sessions))
}

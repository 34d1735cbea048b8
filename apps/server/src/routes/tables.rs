//! # Table Routes

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{Changed, Created};
use cantina_core::validation::validate_name;
use cantina_core::{PendingOrderLine, Table, TableWithOrder};
use cantina_db::{Database, NewTable};

#[derive(Debug, Deserialize)]
pub struct TablePayload {
    pub name: String,
    #[serde(default = "default_kind", rename = "type")]
    pub kind: String,
    #[serde(default = "default_capacity")]
    pub capacity: i64,
}

fn default_kind() -> String {
    "table".to_string()
}

fn default_capacity() -> i64 {
    4
}

impl TablePayload {
    fn validate(&self) -> Result<NewTable, ApiError> {
        validate_name("name", &self.name).map_err(|e| ApiError::validation(e.to_string()))?;

        Ok(NewTable {
            name: self.name.trim().to_string(),
            kind: self.kind.clone(),
            capacity: self.capacity,
        })
    }
}

/// `{ "items": [...] }` - a table's current pending order.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub items: Vec<PendingOrderLine>,
}

/// `GET /api/tables` - all tables with pending-order aggregates.
pub async fn list(State(db): State<Database>) -> Result<Json<Vec<TableWithOrder>>, ApiError> {
    let tables = db.tables().list_with_orders().await?;
    Ok(Json(tables))
}

/// `GET /api/tables/free`
pub async fn list_free(State(db): State<Database>) -> Result<Json<Vec<Table>>, ApiError> {
    let tables = db.tables().list_free().await?;
    Ok(Json(tables))
}

/// `POST /api/tables`
pub async fn create(
    State(db): State<Database>,
    Json(body): Json<TablePayload>,
) -> Result<Json<Created>, ApiError> {
    let new = body.validate()?;
    let id = db.tables().insert(&new).await?;
    Ok(Json(Created::new(id)))
}

/// `PUT /api/tables/{id}`
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(body): Json<TablePayload>,
) -> Result<Json<Changed>, ApiError> {
    let new = body.validate()?;
    let changes = db.tables().update(id, &new).await?;
    Ok(Json(Changed::new(changes)))
}

/// `DELETE /api/tables/{id}`
pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Changed>, ApiError> {
    let changes = db.tables().delete(id).await?;
    Ok(Json(Changed::new(changes)))
}

/// `GET /api/tables/{id}/order`
pub async fn order(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<OrderView>, ApiError> {
    let items = db.tables().pending_order(id).await?;
    Ok(Json(OrderView { items }))
}

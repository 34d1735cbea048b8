//! # Product Routes

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::{Changed, Created};
use cantina_core::validation::{validate_name, validate_non_negative_amount};
use cantina_core::Product;
use cantina_db::{Database, NewProduct};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `?forSale=true` hides sold-out products (the sale screen view).
    #[serde(default, rename = "forSale")]
    pub for_sale: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl ProductPayload {
    fn validate(&self) -> Result<NewProduct, ApiError> {
        validate_name("name", &self.name).map_err(|e| ApiError::validation(e.to_string()))?;
        validate_non_negative_amount("price", self.price)
            .map_err(|e| ApiError::validation(e.to_string()))?;

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            price: self.price,
            stock: self.stock,
            category: self.category.clone(),
        })
    }
}

/// `GET /api/products`
pub async fn list(
    State(db): State<Database>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = db
        .products()
        .list(query.for_sale.unwrap_or(false))
        .await?;
    Ok(Json(products))
}

/// `POST /api/products`
pub async fn create(
    State(db): State<Database>,
    Json(body): Json<ProductPayload>,
) -> Result<Json<Created>, ApiError> {
    let new = body.validate()?;
    let id = db.products().insert(&new).await?;
    Ok(Json(Created::new(id)))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(body): Json<ProductPayload>,
) -> Result<Json<Changed>, ApiError> {
    let new = body.validate()?;
    let changes = db.products().update(id, &new).await?;
    Ok(Json(Changed::new(changes)))
}

/// `DELETE /api/products/{id}`
///
/// Fails with a conflict when historical sale lines reference the product.
pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<Json<Changed>, ApiError> {
    let changes = db.products().delete(id).await?;
    Ok(Json(Changed::new(changes)))
}

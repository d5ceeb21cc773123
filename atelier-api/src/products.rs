use atelier_core::models::NAME_REQUIRED;
use atelier_core::{Product, ProductInput};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    /// Kept loose so a non-string name reports "Name is required" instead of a parse error
    pub name: Option<Value>,
    pub photo: Option<String>,
}

impl ProductRequest {
    pub fn into_input(self) -> Result<ProductInput, AppError> {
        let name = match self.name {
            Some(Value::String(name)) => name,
            _ => return Err(AppError::ValidationError(NAME_REQUIRED.to_string())),
        };
        let input = ProductInput { name, photo: self.photo };
        input.validate()?;
        Ok(input)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Ids are opaque to callers, so an unparseable one simply does not resolve.
pub(crate) fn parse_product_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| product_not_found())
}

pub(crate) fn product_not_found() -> AppError {
    AppError::NotFoundError("Product not found".to_string())
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.repo.list_products().await?;
    debug!("Listing {} products", products.len());
    Ok(Json(products))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let input = json_body(payload)?.into_input()?;
    let product = state.repo.create_product(input).await?;
    info!("Created product {} ({})", product.id, product.name);
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_product_id(&id)?;
    let product = state.repo.get_product(id).await?.ok_or_else(product_not_found)?;
    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let input = json_body(payload)?.into_input()?;
    let id = parse_product_id(&id)?;
    let product = state
        .repo
        .update_product(id, input)
        .await?
        .ok_or_else(product_not_found)?;
    info!("Updated product {}", product.id);
    Ok(Json(product))
}

/// DELETE /api/products/{id}
/// Also removes every material of the product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_product_id(&id)?;
    if !state.repo.delete_product(id).await? {
        return Err(product_not_found());
    }
    info!("Deleted product {}", id);
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

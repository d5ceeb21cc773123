use atelier_core::models::{ALL_FIELDS_REQUIRED, INVALID_QUANTITY_OR_COST};
use atelier_core::{CoreError, Material, MaterialInput};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::products::{json_body, parse_product_id, product_not_found};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub category: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    /// Loose so that `"quantity": "two"` is reported as an invalid number.
    /// An explicit `null` is present but not a number.
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub unit_cost: Option<Value>,
}

/// `Some` for any value the client sent, `null` included.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl MaterialRequest {
    pub fn into_input(self) -> Result<MaterialInput, AppError> {
        let required = || AppError::ValidationError(ALL_FIELDS_REQUIRED.to_string());
        let invalid = || AppError::ValidationError(INVALID_QUANTITY_OR_COST.to_string());

        let category = self.category.ok_or_else(required)?;
        let name = self.name.ok_or_else(required)?;
        let unit = self.unit.ok_or_else(required)?;
        let quantity = self.quantity.ok_or_else(required)?;
        let unit_cost = self.unit_cost.ok_or_else(required)?;

        let input = MaterialInput {
            category,
            name,
            unit,
            quantity: quantity.as_f64().ok_or_else(invalid)?,
            unit_cost: unit_cost.as_f64().ok_or_else(invalid)?,
        };
        input.validate()?;
        Ok(input)
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products/{id}/materials",
            get(list_materials).post(create_material),
        )
        .route(
            "/api/materials/{id}",
            get(get_material).put(update_material).delete(delete_material),
        )
}

fn parse_material_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| material_not_found())
}

fn material_not_found() -> AppError {
    AppError::NotFoundError("Material not found".to_string())
}

/// GET /api/products/{id}/materials
pub async fn list_materials(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Material>>, AppError> {
    // An unknown product simply has no materials.
    let Ok(product_id) = Uuid::parse_str(&product_id) else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.repo.list_materials(product_id).await?))
}

/// POST /api/products/{id}/materials
pub async fn create_material(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    payload: Result<Json<MaterialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Material>), AppError> {
    let input = json_body(payload)?.into_input()?;

    let product_id = parse_product_id(&product_id)?;
    if state.repo.get_product(product_id).await?.is_none() {
        return Err(product_not_found());
    }

    let material = state
        .repo
        .create_material(product_id, input)
        .await
        .map_err(|e| match e {
            // Deleted between the check above and the insert
            CoreError::NotFound(_) => product_not_found(),
            other => other.into(),
        })?;

    info!("Created material {} ({}) for product {}", material.id, material.name, product_id);
    Ok((StatusCode::CREATED, Json(material)))
}

/// GET /api/materials/{id}
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Material>, AppError> {
    let id = parse_material_id(&id)?;
    let material = state.repo.get_material(id).await?.ok_or_else(material_not_found)?;
    Ok(Json(material))
}

/// PUT /api/materials/{id}
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MaterialRequest>, JsonRejection>,
) -> Result<Json<Material>, AppError> {
    let input = json_body(payload)?.into_input()?;
    let id = parse_material_id(&id)?;
    let material = state
        .repo
        .update_material(id, input)
        .await?
        .ok_or_else(material_not_found)?;
    info!("Updated material {}", material.id);
    Ok(Json(material))
}

/// DELETE /api/materials/{id}
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_material_id(&id)?;
    if !state.repo.delete_material(id).await? {
        return Err(material_not_found());
    }
    info!("Deleted material {}", id);
    Ok(Json(json!({ "message": "Material deleted successfully" })))
}

use atelier_core::{COMMON_UNITS, MATERIAL_CATEGORIES};
use axum::{routing::get, Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/catalog/categories", get(list_categories))
        .route("/api/catalog/units", get(list_units))
}

/// GET /api/catalog/categories
pub async fn list_categories() -> Json<Vec<&'static str>> {
    Json(MATERIAL_CATEGORIES.to_vec())
}

/// GET /api/catalog/units
pub async fn list_units() -> Json<Vec<&'static str>> {
    Json(COMMON_UNITS.to_vec())
}

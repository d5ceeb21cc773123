use atelier_catalog::{render_sheet, CostingBreakdown, CostingEngine, CostingOverrides};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::products::{parse_product_id, product_not_found};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/{id}/costing", get(get_costing))
        .route("/api/products/{id}/costing/sheet", get(get_costing_sheet))
}

/// Fetch the product and its materials, then run the engine with the
/// configured defaults overlaid by any query overrides.
async fn breakdown_for(
    state: &AppState,
    raw_id: &str,
    overrides: Result<Query<CostingOverrides>, QueryRejection>,
) -> Result<CostingBreakdown, AppError> {
    let Query(overrides) =
        overrides.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
    let parameters = overrides.apply_to(state.costing_defaults);
    parameters.validate()?;

    let id = parse_product_id(raw_id)?;
    let product = state.repo.get_product(id).await?.ok_or_else(product_not_found)?;
    let materials = state.repo.list_materials(id).await?;

    let breakdown = CostingEngine::new(parameters).calculate(&product, &materials);
    breakdown.ensure_finite()?;

    // Stored line totals should agree with the recomputed ones.
    let stored = state.repo.product_material_cost(id).await?;
    if (stored - breakdown.material_cost).abs() > 1e-6 * stored.abs().max(1.0) {
        warn!(
            "Stored material cost {:.2} for product {} differs from recomputed {:.2}",
            stored, id, breakdown.material_cost
        );
    }

    state.metrics.costing_calculations.inc();
    debug!(
        "Costing for {}: {} materials, {:.2} per unit",
        id, breakdown.material_count, breakdown.total_production_cost_per_unit
    );
    Ok(breakdown)
}

/// GET /api/products/{id}/costing
pub async fn get_costing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    overrides: Result<Query<CostingOverrides>, QueryRejection>,
) -> Result<Json<CostingBreakdown>, AppError> {
    Ok(Json(breakdown_for(&state, &id, overrides).await?))
}

/// GET /api/products/{id}/costing/sheet
/// Printable plain-text version of the breakdown
pub async fn get_costing_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    overrides: Result<Query<CostingOverrides>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let breakdown = breakdown_for(&state, &id, overrides).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_sheet(&breakdown),
    ))
}

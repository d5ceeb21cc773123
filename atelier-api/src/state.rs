use std::sync::Arc;
use atelier_catalog::CostingParameters;
use atelier_core::CatalogRepository;
use atelier_store::app_config::CostingConfig;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CatalogRepository>,
    pub costing_defaults: CostingParameters,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CatalogRepository>, costing: &CostingConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            repo,
            costing_defaults: CostingParameters {
                labor_percentage: costing.labor_percentage,
                overhead_percentage: costing.overhead_percentage,
                markup_multiplier: costing.markup_multiplier,
                quantity: 1,
            },
            metrics,
        }
    }
}

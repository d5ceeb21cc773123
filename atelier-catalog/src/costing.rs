use atelier_core::{Material, Product};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Number of materials reported as top cost drivers
pub const TOP_DRIVER_COUNT: usize = 3;

/// Cost model applied on top of the raw material cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingParameters {
    /// Labor as a percentage of material cost
    pub labor_percentage: f64,

    /// Overhead as a percentage of material cost
    pub overhead_percentage: f64,

    /// Applied to the per-unit production cost to get the suggested retail price
    pub markup_multiplier: f64,

    /// Production run size. Only scales the run totals.
    pub quantity: u32,
}

impl Default for CostingParameters {
    fn default() -> Self {
        Self {
            labor_percentage: 30.0,
            overhead_percentage: 15.0,
            markup_multiplier: 2.5,
            quantity: 1,
        }
    }
}

impl CostingParameters {
    pub fn validate(&self) -> Result<(), CostingError> {
        let rates = [
            ("laborPercentage", self.labor_percentage),
            ("overheadPercentage", self.overhead_percentage),
            ("markupMultiplier", self.markup_multiplier),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(CostingError::InvalidParameter(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }

        if self.quantity < 1 {
            return Err(CostingError::InvalidParameter(
                "quantity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Caller-supplied overrides. Anything left out falls back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingOverrides {
    pub labor_percentage: Option<f64>,
    pub overhead_percentage: Option<f64>,
    pub markup_multiplier: Option<f64>,
    pub quantity: Option<u32>,
}

impl CostingOverrides {
    pub fn apply_to(&self, defaults: CostingParameters) -> CostingParameters {
        CostingParameters {
            labor_percentage: self.labor_percentage.unwrap_or(defaults.labor_percentage),
            overhead_percentage: self.overhead_percentage.unwrap_or(defaults.overhead_percentage),
            markup_multiplier: self.markup_multiplier.unwrap_or(defaults.markup_multiplier),
            quantity: self.quantity.unwrap_or(defaults.quantity),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CostingError {
    #[error("Invalid costing parameter: {0}")]
    InvalidParameter(String),
}

/// Derived cost report for one product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingBreakdown {
    pub product: Product,
    pub parameters: CostingParameters,
    pub material_count: usize,

    // Per single unit of the product
    pub material_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub total_production_cost_per_unit: f64,
    pub suggested_retail: f64,

    // Scaled by the production run quantity
    pub total_material_cost_for_run: f64,
    pub labor_cost_for_run: f64,
    pub overhead_cost_for_run: f64,
    pub total_production_cost_for_run: f64,

    pub categories: Vec<CategoryBreakdown>,
    pub top_cost_drivers: Vec<CostDriver>,
}

impl CostingBreakdown {
    /// Large rates or run sizes can overflow to infinity. Every reported
    /// figure must be a real number.
    pub fn ensure_finite(&self) -> Result<(), CostingError> {
        let figures = [
            self.material_cost,
            self.labor_cost,
            self.overhead_cost,
            self.total_production_cost_per_unit,
            self.suggested_retail,
            self.total_material_cost_for_run,
            self.labor_cost_for_run,
            self.overhead_cost_for_run,
            self.total_production_cost_for_run,
        ];
        let categories_ok = self.categories.iter().all(|c| {
            c.total_for_run.is_finite() && c.lines.iter().all(|l| l.line_total_for_run.is_finite())
        });

        if figures.iter().all(|f| f.is_finite()) && categories_ok {
            Ok(())
        } else {
            Err(CostingError::InvalidParameter(
                "parameters produce costs too large to represent".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: f64,
    pub total_for_run: f64,
    /// Share of the product's material cost, 0-100
    pub percentage: f64,
    pub lines: Vec<MaterialLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub line_total: f64,
    pub line_total_for_run: f64,
    /// Share of the category total, 0-100
    pub percentage_of_category: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostDriver {
    pub rank: usize,
    pub material_id: Uuid,
    pub name: String,
    pub category: String,
    pub line_total: f64,
}

/// Turns a product's materials into a cost breakdown. Pure, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostingEngine {
    parameters: CostingParameters,
}

impl CostingEngine {
    pub fn new(parameters: CostingParameters) -> Self {
        Self { parameters }
    }

    pub fn calculate(&self, product: &Product, materials: &[Material]) -> CostingBreakdown {
        let params = self.parameters;
        let run = params.quantity as f64;

        let material_cost: f64 = materials.iter().map(Material::line_total).sum();

        // Categories keep the order in which they first appear.
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&Material>)> = Vec::new();
        for material in materials {
            let slot = *index.entry(material.category.as_str()).or_insert_with(|| {
                groups.push((material.category.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(material);
        }

        let categories = groups
            .into_iter()
            .map(|(category, members)| {
                let total: f64 = members.iter().map(|m| m.line_total()).sum();
                let lines = members
                    .iter()
                    .map(|m| {
                        let line_total = m.line_total();
                        MaterialLine {
                            material_id: m.id,
                            name: m.name.clone(),
                            unit: m.unit.clone(),
                            quantity: m.quantity,
                            unit_cost: m.unit_cost,
                            line_total,
                            line_total_for_run: line_total * run,
                            percentage_of_category: percentage(line_total, total),
                        }
                    })
                    .collect();

                CategoryBreakdown {
                    category: category.to_string(),
                    total,
                    total_for_run: total * run,
                    percentage: percentage(total, material_cost),
                    lines,
                }
            })
            .collect();

        let labor_cost = material_cost * params.labor_percentage / 100.0;
        let overhead_cost = material_cost * params.overhead_percentage / 100.0;
        let total_production_cost_per_unit = material_cost + labor_cost + overhead_cost;
        let suggested_retail = total_production_cost_per_unit * params.markup_multiplier;

        CostingBreakdown {
            product: product.clone(),
            parameters: params,
            material_count: materials.len(),
            material_cost,
            labor_cost,
            overhead_cost,
            total_production_cost_per_unit,
            suggested_retail,
            total_material_cost_for_run: material_cost * run,
            labor_cost_for_run: labor_cost * run,
            overhead_cost_for_run: overhead_cost * run,
            total_production_cost_for_run: total_production_cost_per_unit * run,
            categories,
            top_cost_drivers: top_cost_drivers(materials),
        }
    }
}

/// Materials ranked by line total, highest first. Ties keep input order.
pub fn top_cost_drivers(materials: &[Material]) -> Vec<CostDriver> {
    let mut ranked: Vec<&Material> = materials.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.line_total().total_cmp(&a.line_total()));

    ranked
        .into_iter()
        .take(TOP_DRIVER_COUNT)
        .enumerate()
        .map(|(i, m)| CostDriver {
            rank: i + 1,
            material_id: m.id,
            name: m.name.clone(),
            category: m.category.clone(),
            line_total: m.line_total(),
        })
        .collect()
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::{MaterialInput, ProductInput};
    use chrono::{TimeZone, Utc};

    fn product(name: &str) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Product::new(ProductInput { name: name.to_string(), photo: None }, now)
    }

    fn material(product: &Product, category: &str, name: &str, quantity: f64, unit_cost: f64) -> Material {
        let input = MaterialInput {
            category: category.to_string(),
            name: name.to_string(),
            unit: "pieces".to_string(),
            quantity,
            unit_cost,
        };
        Material::new(product.id, input, product.created_at)
    }

    fn sneaker_a() -> (Product, Vec<Material>) {
        let p = product("Sneaker A");
        let materials = vec![
            material(&p, "Sole", "Rubber sole", 2.0, 100.0),
            material(&p, "Upper", "Canvas upper", 1.0, 300.0),
        ];
        (p, materials)
    }

    #[test]
    fn test_sneaker_scenario_with_defaults() {
        let (p, materials) = sneaker_a();
        let breakdown = CostingEngine::default().calculate(&p, &materials);

        assert_eq!(breakdown.material_cost, 500.0);
        assert_eq!(breakdown.labor_cost, 150.0);
        assert_eq!(breakdown.overhead_cost, 75.0);
        assert_eq!(breakdown.total_production_cost_per_unit, 725.0);
        assert_eq!(breakdown.suggested_retail, 1812.5);
        assert_eq!(breakdown.material_count, 2);

        let drivers: Vec<&str> = breakdown.top_cost_drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(drivers, vec!["Canvas upper", "Rubber sole"]);
        assert_eq!(breakdown.top_cost_drivers[0].rank, 1);
    }

    #[test]
    fn test_category_breakdown() {
        let (p, materials) = sneaker_a();
        let breakdown = CostingEngine::default().calculate(&p, &materials);

        assert_eq!(breakdown.categories.len(), 2);
        let sole = &breakdown.categories[0];
        assert_eq!(sole.category, "Sole");
        assert_eq!(sole.total, 200.0);
        assert_eq!(sole.percentage, 40.0);
        assert_eq!(sole.lines[0].percentage_of_category, 100.0);

        let upper = &breakdown.categories[1];
        assert_eq!(upper.total, 300.0);
        assert_eq!(upper.percentage, 60.0);
    }

    #[test]
    fn test_empty_materials() {
        let p = product("Bare");
        let breakdown = CostingEngine::default().calculate(&p, &[]);

        assert_eq!(breakdown.material_cost, 0.0);
        assert_eq!(breakdown.total_production_cost_per_unit, 0.0);
        assert_eq!(breakdown.suggested_retail, 0.0);
        assert_eq!(breakdown.total_production_cost_for_run, 0.0);
        assert!(breakdown.categories.is_empty());
        assert!(breakdown.top_cost_drivers.is_empty());
    }

    #[test]
    fn test_zero_cost_category_has_no_division() {
        let p = product("Freebie");
        let materials = vec![
            material(&p, "Packaging", "Recycled box", 1.0, 0.0),
            material(&p, "Packaging", "Tissue", 2.0, 0.0),
        ];
        let breakdown = CostingEngine::default().calculate(&p, &materials);

        assert_eq!(breakdown.material_cost, 0.0);
        assert_eq!(breakdown.categories[0].percentage, 0.0);
        assert!(breakdown.categories[0].lines.iter().all(|l| l.percentage_of_category == 0.0));
        assert_eq!(breakdown.top_cost_drivers.len(), 2);
    }

    #[test]
    fn test_run_quantity_scales_totals_only() {
        let (p, materials) = sneaker_a();
        let engine = CostingEngine::new(CostingParameters { quantity: 10, ..Default::default() });
        let breakdown = engine.calculate(&p, &materials);

        assert_eq!(breakdown.material_cost, 500.0);
        assert_eq!(breakdown.total_material_cost_for_run, 5000.0);
        assert_eq!(breakdown.labor_cost_for_run, 1500.0);
        assert_eq!(breakdown.overhead_cost_for_run, 750.0);
        assert_eq!(breakdown.total_production_cost_for_run, 7250.0);
        assert_eq!(breakdown.suggested_retail, 1812.5);
        assert_eq!(breakdown.categories[1].total_for_run, 3000.0);
    }

    #[test]
    fn test_material_cost_is_order_independent() {
        let p = product("Boot");
        let mut materials = vec![
            material(&p, "Upper Materials", "Suede", 0.5, 640.0),
            material(&p, "Sole Materials", "EVA midsole", 1.0, 85.0),
            material(&p, "Hardware", "Eyelets", 16.0, 1.5),
            material(&p, "Lining", "Mesh", 0.25, 120.0),
        ];
        let engine = CostingEngine::default();
        let forward = engine.calculate(&p, &materials).material_cost;
        materials.reverse();
        let backward = engine.calculate(&p, &materials).material_cost;

        let expected: f64 = 320.0 + 85.0 + 24.0 + 30.0;
        assert!((forward - expected).abs() < 1e-9);
        assert!((backward - expected).abs() < 1e-9);
    }

    #[test]
    fn test_category_totals_partition_material_cost() {
        let p = product("Sandal");
        let materials = vec![
            material(&p, "Sole Materials", "Cork bed", 1.0, 210.0),
            material(&p, "Hardware", "Buckle", 2.0, 18.5),
            material(&p, "Sole Materials", "Outsole", 1.0, 95.25),
            material(&p, "Adhesives", "Contact cement", 15.0, 0.4),
            material(&p, "Hardware", "Rivet", 4.0, 0.75),
        ];
        let breakdown = CostingEngine::default().calculate(&p, &materials);

        let category_sum: f64 = breakdown.categories.iter().map(|c| c.total).sum();
        assert!((category_sum - breakdown.material_cost).abs() < 1e-9);
        let share_sum: f64 = breakdown.categories.iter().map(|c| c.percentage).sum();
        assert!((share_sum - 100.0).abs() < 1e-9);
        assert_eq!(breakdown.categories.len(), 3);
    }

    #[test]
    fn test_production_cost_and_retail_relationship() {
        let (p, materials) = sneaker_a();
        let engine = CostingEngine::new(CostingParameters {
            labor_percentage: 42.5,
            overhead_percentage: 0.0,
            markup_multiplier: 3.1,
            quantity: 1,
        });
        let breakdown = engine.calculate(&p, &materials);

        assert!(breakdown.total_production_cost_per_unit >= breakdown.material_cost);
        assert_eq!(
            breakdown.suggested_retail,
            breakdown.total_production_cost_per_unit * 3.1
        );
    }

    #[test]
    fn test_top_drivers_ties_keep_input_order() {
        let p = product("Tie");
        let materials = vec![
            material(&p, "Other", "first", 1.0, 10.0),
            material(&p, "Other", "second", 2.0, 50.0),
            material(&p, "Other", "third", 1.0, 10.0),
            material(&p, "Other", "fourth", 1.0, 10.0),
        ];
        let drivers = top_cost_drivers(&materials);

        let names: Vec<&str> = drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first", "third"]);
        assert_eq!(drivers.iter().map(|d| d.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_calculation_is_repeatable() {
        let (p, materials) = sneaker_a();
        let engine = CostingEngine::default();
        assert_eq!(engine.calculate(&p, &materials), engine.calculate(&p, &materials));
    }

    #[test]
    fn test_overrides_and_validation() {
        let overrides = CostingOverrides {
            labor_percentage: Some(20.0),
            quantity: Some(12),
            ..Default::default()
        };
        let params = overrides.apply_to(CostingParameters::default());
        assert_eq!(params.labor_percentage, 20.0);
        assert_eq!(params.overhead_percentage, 15.0);
        assert_eq!(params.markup_multiplier, 2.5);
        assert_eq!(params.quantity, 12);
        assert!(params.validate().is_ok());

        let negative = CostingParameters { overhead_percentage: -5.0, ..Default::default() };
        assert!(negative.validate().is_err());

        let empty_run = CostingParameters { quantity: 0, ..Default::default() };
        assert!(empty_run.validate().is_err());
    }

    #[test]
    fn test_overflowing_parameters_are_rejected() {
        let (p, materials) = sneaker_a();
        assert!(CostingEngine::default().calculate(&p, &materials).ensure_finite().is_ok());

        // Each rate is finite on its own; the products are not.
        let huge = CostingParameters {
            labor_percentage: 1e308,
            markup_multiplier: 1e308,
            ..Default::default()
        };
        assert!(huge.validate().is_ok());
        let breakdown = CostingEngine::new(huge).calculate(&p, &materials);
        assert!(matches!(
            breakdown.ensure_finite(),
            Err(CostingError::InvalidParameter(_))
        ));

        let bare = CostingEngine::new(huge).calculate(&product("Bare"), &[]);
        assert!(bare.ensure_finite().is_ok());
    }

    #[test]
    fn test_breakdown_serializes_camel_case() {
        let (p, materials) = sneaker_a();
        let breakdown = CostingEngine::default().calculate(&p, &materials);
        let json = serde_json::to_value(&breakdown).unwrap();

        assert_eq!(json["materialCost"], serde_json::json!(500.0));
        assert_eq!(json["suggestedRetail"], serde_json::json!(1812.5));
        assert_eq!(json["parameters"]["laborPercentage"], serde_json::json!(30.0));
        assert_eq!(json["topCostDrivers"][0]["name"], serde_json::json!("Canvas upper"));
    }
}

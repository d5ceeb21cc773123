use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Suggested material categories. Grouping labels only, never enforced.
pub const MATERIAL_CATEGORIES: [&str; 7] = [
    "Upper Materials",
    "Sole Materials",
    "Hardware",
    "Lining",
    "Adhesives",
    "Packaging",
    "Other",
];

/// Suggested units of measure for material quantities.
pub const COMMON_UNITS: [&str; 11] = [
    "pieces", "pairs", "meters", "cm", "grams", "kg", "ml", "liters", "gallon", "yards", "feet",
];

pub const NAME_REQUIRED: &str = "Name is required";
pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const INVALID_QUANTITY_OR_COST: &str = "Invalid quantity or unit cost";

/// A sellable item whose production cost is tracked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(input: ProductInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            photo: input.photo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable fields. `id` and `created_at` never change.
    pub fn apply(&mut self, input: ProductInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.photo = input.photo;
        self.updated_at = now;
    }
}

/// A line-item input consumed to produce one unit of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub product_id: Uuid,
    pub category: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    pub fn new(product_id: Uuid, input: MaterialInput, now: DateTime<Utc>) -> Self {
        let total_cost = input.total_cost();
        Self {
            id: Uuid::new_v4(),
            product_id,
            category: input.category,
            name: input.name,
            unit: input.unit,
            quantity: input.quantity,
            unit_cost: input.unit_cost,
            total_cost,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable fields and recompute `total_cost`.
    pub fn apply(&mut self, input: MaterialInput, now: DateTime<Utc>) {
        self.total_cost = input.total_cost();
        self.category = input.category;
        self.name = input.name;
        self.unit = input.unit;
        self.quantity = input.quantity;
        self.unit_cost = input.unit_cost;
        self.updated_at = now;
    }

    /// Cost of this line for a single unit of the product.
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

/// Mutable fields of a product, used for both create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl ProductInput {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ValidationError(NAME_REQUIRED.to_string()));
        }
        Ok(())
    }
}

/// Mutable fields of a material, used for both create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInput {
    pub category: String,
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

impl MaterialInput {
    pub fn validate(&self) -> CoreResult<()> {
        let required = [&self.category, &self.name, &self.unit];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(CoreError::ValidationError(ALL_FIELDS_REQUIRED.to_string()));
        }

        let quantity_ok = self.quantity.is_finite() && self.quantity > 0.0;
        let unit_cost_ok = self.unit_cost.is_finite() && self.unit_cost >= 0.0;
        // Both finite is not enough, the product can still overflow.
        if !quantity_ok || !unit_cost_ok || !self.total_cost().is_finite() {
            return Err(CoreError::ValidationError(INVALID_QUANTITY_OR_COST.to_string()));
        }

        Ok(())
    }

    pub fn total_cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

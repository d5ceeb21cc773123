use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Material, MaterialInput, Product, ProductInput};
use crate::CoreResult;

/// Repository trait for product and material records.
///
/// A missing record is reported as `None` or `false`, never as an error.
/// Errors are reserved for storage failures, invalid input, and creating a
/// material under a product that does not exist.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_products(&self) -> CoreResult<Vec<Product>>;

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>>;

    async fn create_product(&self, input: ProductInput) -> CoreResult<Product>;

    async fn update_product(&self, id: Uuid, input: ProductInput) -> CoreResult<Option<Product>>;

    /// Removes the product together with all of its materials.
    async fn delete_product(&self, id: Uuid) -> CoreResult<bool>;

    async fn list_materials(&self, product_id: Uuid) -> CoreResult<Vec<Material>>;

    async fn get_material(&self, id: Uuid) -> CoreResult<Option<Material>>;

    async fn create_material(&self, product_id: Uuid, input: MaterialInput) -> CoreResult<Material>;

    async fn update_material(&self, id: Uuid, input: MaterialInput) -> CoreResult<Option<Material>>;

    async fn delete_material(&self, id: Uuid) -> CoreResult<bool>;

    /// Sum of the stored `total_cost` over a product's materials.
    async fn product_material_cost(&self, product_id: Uuid) -> CoreResult<f64> {
        let materials = self.list_materials(product_id).await?;
        Ok(materials.iter().map(|m| m.total_cost).sum())
    }
}

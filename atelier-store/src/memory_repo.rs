use async_trait::async_trait;
use atelier_core::{
    CatalogRepository, Clock, CoreError, CoreResult, Material, MaterialInput, Product, ProductInput,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    products: Vec<Product>,
    materials: Vec<Material>,
}

/// In-memory catalog. Both tables sit behind one lock so cascades are atomic.
pub struct MemoryCatalogRepository {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryCatalogRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalogRepository {
    async fn list_products(&self) -> CoreResult<Vec<Product>> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_product(&self, input: ProductInput) -> CoreResult<Product> {
        input.validate()?;

        let product = Product::new(input, self.clock.now());
        self.tables.write().await.products.push(product.clone());
        info!("Product created: {}", product.id);
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> CoreResult<Option<Product>> {
        input.validate()?;

        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            debug!("Product {} not found for update", id);
            return Ok(None);
        };
        product.apply(input, self.clock.now());
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.products.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        tables.products.remove(index);
        let before = tables.materials.len();
        tables.materials.retain(|m| m.product_id != id);
        info!(
            "Product deleted: {} ({} materials removed)",
            id,
            before - tables.materials.len()
        );
        Ok(true)
    }

    async fn list_materials(&self, product_id: Uuid) -> CoreResult<Vec<Material>> {
        let tables = self.tables.read().await;
        Ok(tables
            .materials
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn get_material(&self, id: Uuid) -> CoreResult<Option<Material>> {
        let tables = self.tables.read().await;
        Ok(tables.materials.iter().find(|m| m.id == id).cloned())
    }

    async fn create_material(&self, product_id: Uuid, input: MaterialInput) -> CoreResult<Material> {
        input.validate()?;

        let mut tables = self.tables.write().await;
        if !tables.products.iter().any(|p| p.id == product_id) {
            return Err(CoreError::NotFound(format!("Product {}", product_id)));
        }

        let material = Material::new(product_id, input, self.clock.now());
        tables.materials.push(material.clone());
        info!("Material created: {} for product {}", material.id, product_id);
        Ok(material)
    }

    async fn update_material(&self, id: Uuid, input: MaterialInput) -> CoreResult<Option<Material>> {
        input.validate()?;

        let mut tables = self.tables.write().await;
        let Some(material) = tables.materials.iter_mut().find(|m| m.id == id) else {
            debug!("Material {} not found for update", id);
            return Ok(None);
        };
        material.apply(input, self.clock.now());
        Ok(Some(material.clone()))
    }

    async fn delete_material(&self, id: Uuid) -> CoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.materials.len();
        tables.materials.retain(|m| m.id != id);
        Ok(tables.materials.len() < before)
    }
}

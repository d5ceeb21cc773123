use async_trait::async_trait;
use atelier_core::{
    CatalogRepository, Clock, CoreError, CoreResult, Material, MaterialInput, Product, ProductInput,
};
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, photo, created_at, updated_at";
const MATERIAL_COLUMNS: &str =
    "id, product_id, category, name, unit, quantity, unit_cost, total_cost, created_at, updated_at";

/// Postgres-backed catalog. Timestamps come from the injected clock, not `NOW()`.
pub struct PgCatalogRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        storage_timestamp(self.clock.now())
    }
}

/// TIMESTAMPTZ keeps microseconds. Returned entities must match what a later read sees.
fn storage_timestamp(now: DateTime<Utc>) -> DateTime<Utc> {
    now.trunc_subsecs(6)
}

fn list_products_sql() -> String {
    format!("SELECT {} FROM products ORDER BY seq", PRODUCT_COLUMNS)
}

fn list_materials_sql() -> String {
    format!(
        "SELECT {} FROM materials WHERE product_id = $1 ORDER BY seq",
        MATERIAL_COLUMNS
    )
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    photo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            photo: row.photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MaterialRow {
    id: Uuid,
    product_id: Uuid,
    category: String,
    name: String,
    unit: String,
    quantity: f64,
    unit_cost: f64,
    total_cost: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            category: row.category,
            name: row.name,
            unit: row.unit,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            total_cost: row.total_cost,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    error!("Database error: {}", err);
    CoreError::StorageError(err.to_string())
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_products(&self) -> CoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&list_products_sql())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, input: ProductInput) -> CoreResult<Product> {
        input.validate()?;
        let product = Product::new(input, self.now());

        sqlx::query(
            r#"
            INSERT INTO products (id, name, photo, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.photo)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        info!("Product created: {}", product.id);
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> CoreResult<Option<Product>> {
        input.validate()?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET name = $1, photo = $2, updated_at = $3 WHERE id = $4 RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.photo)
        .bind(self.now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: Uuid) -> CoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let materials = sqlx::query("DELETE FROM materials WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        let products = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        let existed = products.rows_affected() > 0;
        if existed {
            info!(
                "Product deleted: {} ({} materials removed)",
                id,
                materials.rows_affected()
            );
        }
        Ok(existed)
    }

    async fn list_materials(&self, product_id: Uuid) -> CoreResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(&list_materials_sql())
            .bind(product_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(rows.into_iter().map(Material::from).collect())
    }

    async fn get_material(&self, id: Uuid) -> CoreResult<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {} FROM materials WHERE id = $1",
            MATERIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Material::from))
    }

    async fn create_material(&self, product_id: Uuid, input: MaterialInput) -> CoreResult<Material> {
        input.validate()?;
        let material = Material::new(product_id, input, self.now());

        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // Lock the parent row so a concurrent delete cannot orphan the insert.
        let parent: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR SHARE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(storage_error)?;
        if parent.is_none() {
            return Err(CoreError::NotFound(format!("Product {}", product_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO materials (id, product_id, category, name, unit, quantity, unit_cost, total_cost, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(material.id)
        .bind(material.product_id)
        .bind(&material.category)
        .bind(&material.name)
        .bind(&material.unit)
        .bind(material.quantity)
        .bind(material.unit_cost)
        .bind(material.total_cost)
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        info!("Material created: {} for product {}", material.id, product_id);
        Ok(material)
    }

    async fn update_material(&self, id: Uuid, input: MaterialInput) -> CoreResult<Option<Material>> {
        input.validate()?;

        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            r#"
            UPDATE materials
            SET category = $1, name = $2, unit = $3, quantity = $4, unit_cost = $5, total_cost = $6, updated_at = $7
            WHERE id = $8
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(&input.category)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.quantity)
        .bind(input.unit_cost)
        .bind(input.total_cost())
        .bind(self.now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(Material::from))
    }

    async fn delete_material(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn product_material_cost(&self, product_id: Uuid) -> CoreResult<f64> {
        let (total,): (f64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cost), 0)::FLOAT8 FROM materials WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(total)
    }
}

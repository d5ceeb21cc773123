pub mod clock;
pub mod models;
pub mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use models::{Material, MaterialInput, Product, ProductInput, COMMON_UNITS, MATERIAL_CATEGORIES};
pub use repository::CatalogRepository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    StorageError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

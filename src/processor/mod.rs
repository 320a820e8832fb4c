// Bunch processor: the persistence boundary the observers write through

pub mod memory;

pub use memory::*;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entity::PreparedEntity;
use crate::types::EntityId;

/// Errors reported by a bunch processor. Observers pass them through unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

/// Create/update operations for products and their inventory records.
///
/// `persist_product` must return the same identifier for every persist of a
/// given SKU, whether it created or updated the row.
#[async_trait]
pub trait BunchProcessor: Send + Sync {
    /// Load the stored product with this SKU
    async fn load_product(&self, sku: &str) -> Result<Option<Map<String, Value>>, PersistenceError>;

    /// Insert or update a product and return its identifier
    async fn persist_product(&self, product: &PreparedEntity) -> Result<EntityId, PersistenceError>;

    async fn persist_stock_status(&self, stock_status: &Map<String, Value>) -> Result<(), PersistenceError>;

    async fn persist_stock_item(&self, stock_item: &Map<String, Value>) -> Result<(), PersistenceError>;
}

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{BunchProcessor, PersistenceError};
use crate::entity::PreparedEntity;
use crate::keys::member;
use crate::types::{EntityId, EntityOperation};

/// One call received by the in-memory processor, in arrival order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ProcessorCall {
    LoadProduct { sku: String },
    PersistProduct { sku: String, operation: EntityOperation },
    PersistStockStatus { product_id: i64 },
    PersistStockItem { product_id: i64 },
}

/// Which processor operation an injected failure applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorOperation {
    LoadProduct,
    PersistProduct,
    PersistStockStatus,
    PersistStockItem,
}

/// (product_id, website_id, stock_id)
pub type InventoryKey = (i64, i64, i64);

#[derive(Debug, Default)]
struct MemoryStore {
    products: BTreeMap<String, Map<String, Value>>,
    next_id: i64,
    stock_statuses: BTreeMap<InventoryKey, Map<String, Value>>,
    stock_items: BTreeMap<InventoryKey, Map<String, Value>>,
    calls: Vec<ProcessorCall>,
    failures: HashMap<ProcessorOperation, PersistenceError>,
}

impl MemoryStore {
    fn take_failure(&mut self, operation: ProcessorOperation) -> Result<(), PersistenceError> {
        match self.failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }
}

/// SKU-indexed store used by the CLI and the tests.
///
/// Products upsert by SKU with sequential identifiers; inventory records upsert
/// by their (product, website, stock) key. Every call is logged.
#[derive(Debug, Default)]
pub struct InMemoryBunchProcessor {
    store: RwLock<MemoryStore>,
}

impl InMemoryBunchProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a product as if an earlier run had imported it. Seeding is not logged.
    pub async fn seed_product(&self, mut product: Map<String, Value>) -> Result<EntityId, PersistenceError> {
        let sku = product_sku(&product)?;
        let mut store = self.store.write().await;

        let id = match product.get(member::ENTITY_ID).and_then(EntityId::from_value) {
            Some(id) => {
                store.next_id = store.next_id.max(id.0);
                id
            }
            None => store.allocate_id(),
        };
        product.insert(member::ENTITY_ID.to_string(), id.into());
        store.products.insert(sku, product);
        Ok(id)
    }

    /// Make the next call of `operation` fail with `error`
    pub async fn fail_next(&self, operation: ProcessorOperation, error: PersistenceError) {
        self.store.write().await.failures.insert(operation, error);
    }

    pub async fn calls(&self) -> Vec<ProcessorCall> {
        self.store.read().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.store.write().await.calls.clear();
    }

    pub async fn product(&self, sku: &str) -> Option<Map<String, Value>> {
        self.store.read().await.products.get(sku).cloned()
    }

    pub async fn product_count(&self) -> usize {
        self.store.read().await.products.len()
    }

    pub async fn stock_status(&self, key: InventoryKey) -> Option<Map<String, Value>> {
        self.store.read().await.stock_statuses.get(&key).cloned()
    }

    pub async fn stock_item(&self, key: InventoryKey) -> Option<Map<String, Value>> {
        self.store.read().await.stock_items.get(&key).cloned()
    }

    /// Everything stored, as JSON
    pub async fn snapshot(&self) -> Value {
        let store = self.store.read().await;
        json!({
            "products": store.products.values().cloned().map(Value::Object).collect::<Vec<_>>(),
            "stock_statuses": store.stock_statuses.values().cloned().map(Value::Object).collect::<Vec<_>>(),
            "stock_items": store.stock_items.values().cloned().map(Value::Object).collect::<Vec<_>>(),
        })
    }
}

#[async_trait]
impl BunchProcessor for InMemoryBunchProcessor {
    async fn load_product(&self, sku: &str) -> Result<Option<Map<String, Value>>, PersistenceError> {
        let mut store = self.store.write().await;
        store.calls.push(ProcessorCall::LoadProduct { sku: sku.to_string() });
        store.take_failure(ProcessorOperation::LoadProduct)?;

        Ok(store.products.get(sku).cloned())
    }

    async fn persist_product(&self, product: &PreparedEntity) -> Result<EntityId, PersistenceError> {
        let sku = product_sku(&product.fields)?;
        let mut store = self.store.write().await;
        store.calls.push(ProcessorCall::PersistProduct {
            sku: sku.clone(),
            operation: product.operation,
        });
        store.take_failure(ProcessorOperation::PersistProduct)?;

        let stored_id = store
            .products
            .get(&sku)
            .and_then(|stored| stored.get(member::ENTITY_ID))
            .and_then(EntityId::from_value);

        let id = match (product.operation, stored_id) {
            (EntityOperation::Update, Some(stored)) => {
                if let Some(claimed) = product.entity_id() {
                    if claimed != stored {
                        return Err(PersistenceError::Constraint(format!(
                            "Product {} is stored as {}, update claims {}",
                            sku, stored, claimed
                        )));
                    }
                }
                stored
            }
            (EntityOperation::Update, None) => {
                return Err(PersistenceError::NotFound(format!("Product {} not found for update", sku)));
            }
            // upsert: a create for a stored SKU keeps its identifier
            (EntityOperation::Create, Some(stored)) => stored,
            (EntityOperation::Create, None) => store.allocate_id(),
        };

        let mut fields = product.fields.clone();
        fields.insert(member::ENTITY_ID.to_string(), id.into());
        store.products.insert(sku, fields);

        Ok(id)
    }

    async fn persist_stock_status(&self, stock_status: &Map<String, Value>) -> Result<(), PersistenceError> {
        let key = inventory_key(stock_status)?;
        let mut store = self.store.write().await;
        store.calls.push(ProcessorCall::PersistStockStatus { product_id: key.0 });
        store.take_failure(ProcessorOperation::PersistStockStatus)?;

        store.stock_statuses.insert(key, stock_status.clone());
        Ok(())
    }

    async fn persist_stock_item(&self, stock_item: &Map<String, Value>) -> Result<(), PersistenceError> {
        let key = inventory_key(stock_item)?;
        let mut store = self.store.write().await;
        store.calls.push(ProcessorCall::PersistStockItem { product_id: key.0 });
        store.take_failure(ProcessorOperation::PersistStockItem)?;

        store.stock_items.insert(key, stock_item.clone());
        Ok(())
    }
}

fn product_sku(product: &Map<String, Value>) -> Result<String, PersistenceError> {
    product
        .get(member::SKU)
        .and_then(Value::as_str)
        .filter(|sku| !sku.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PersistenceError::Constraint("Product without SKU".to_string()))
}

fn inventory_key(record: &Map<String, Value>) -> Result<InventoryKey, PersistenceError> {
    let part = |field: &str| {
        record
            .get(field)
            .and_then(EntityId::from_value)
            .map(|id| id.0)
            .ok_or_else(|| PersistenceError::Constraint(format!("Inventory record without {}", field)))
    };
    Ok((part(member::PRODUCT_ID)?, part(member::WEBSITE_ID)?, part(member::STOCK_ID)?))
}

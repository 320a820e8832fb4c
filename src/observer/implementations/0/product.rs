// Ring 0: Product - creates or updates the product and publishes its id
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::entity::PreparedEntity;
use crate::keys::{column, member};
use crate::observer::context::{PublishedEntity, RowContext};
use crate::observer::error::ObserverError;
use crate::observer::traits::{EntityObserver, Observer, ObserverRing};
use crate::processor::BunchProcessor;

/// Ring 0: Product Observer - upserts the row's product by SKU
pub struct ProductObserver {
    processor: Arc<dyn BunchProcessor>,
}

impl ProductObserver {
    pub const NAME: &'static str = "ProductObserver";

    pub fn new(processor: Arc<dyn BunchProcessor>) -> Self {
        Self { processor }
    }
}

impl Observer for ProductObserver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Entity
    }
}

#[async_trait]
impl EntityObserver for ProductObserver {
    async fn execute(&self, ctx: &mut RowContext<'_>) -> Result<(), ObserverError> {
        // a SKU seen earlier in the batch means this row adds nothing new
        let sku = ctx.sku()?;
        if ctx.has_been_processed(sku) {
            tracing::trace!("Row {}: product {} already processed, skipping", ctx.row.line, sku);
            return Ok(());
        }

        let attributes = self.prepare_attributes(ctx)?;
        let product = self.initialize_product(sku, attributes).await?;

        let entity_id = self.processor.persist_product(&product).await?;

        tracing::debug!(
            "Row {}: persisted product {} as {} ({:?}, changed={:?})",
            ctx.row.line,
            sku,
            entity_id,
            product.operation,
            product.changes()
        );

        ctx.publish_entity(PublishedEntity {
            entity_id,
            sku: sku.to_string(),
            operation: product.operation,
        });

        Ok(())
    }
}

impl ProductObserver {
    /// Attributes derived from the row alone
    fn prepare_attributes(&self, ctx: &RowContext<'_>) -> Result<Map<String, Value>, ObserverError> {
        let subject = ctx.subject;

        let created_at = ctx.formatted_value(column::CREATED_AT, subject.now(), |value| {
            subject.format_date(column::CREATED_AT, value)
        })?;
        let updated_at = ctx.formatted_value(column::UPDATED_AT, subject.now(), |value| {
            subject.format_date(column::UPDATED_AT, value)
        })?;

        let sku = ctx.sku()?;
        let attribute_set = ctx.attribute_set()?;

        let mut attributes = Map::new();
        attributes.insert(member::SKU.to_string(), Value::from(sku));
        attributes.insert(member::CREATED_AT.to_string(), Value::from(created_at));
        attributes.insert(member::UPDATED_AT.to_string(), Value::from(updated_at));
        attributes.insert(member::HAS_OPTIONS.to_string(), Value::from(0));
        attributes.insert(member::REQUIRED_OPTIONS.to_string(), Value::from(0));
        if let Some(product_type) = ctx.value(column::PRODUCT_TYPE) {
            attributes.insert(member::TYPE_ID.to_string(), Value::from(product_type));
        }
        attributes.insert(
            member::ATTRIBUTE_SET_ID.to_string(),
            Value::from(attribute_set.attribute_set_id),
        );

        Ok(attributes)
    }

    /// Overlay the prepared attributes on the stored product, if there is one
    async fn initialize_product(
        &self,
        sku: &str,
        attributes: Map<String, Value>,
    ) -> Result<PreparedEntity, ObserverError> {
        let loaded = self.processor.load_product(sku).await?;
        Ok(PreparedEntity::from_lookup(loaded, attributes))
    }
}

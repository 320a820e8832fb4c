// Ring 1: Product Inventory - stock status and stock item for the row's product
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::product::ProductObserver;
use crate::attribute::{single_mapping, AttributeLoader, BackendType};
use crate::entity::overlay;
use crate::keys::{column, member};
use crate::observer::context::RowContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{DependentObserver, Observer, ObserverRing};
use crate::processor::BunchProcessor;

/// Ring 1: Product Inventory Observer - persists stock status and stock item
/// keyed by the product id published in ring 0
pub struct ProductInventoryObserver {
    processor: Arc<dyn BunchProcessor>,
    attribute_loader: Arc<dyn AttributeLoader>,
}

impl ProductInventoryObserver {
    pub const NAME: &'static str = "ProductInventoryObserver";

    pub fn new(processor: Arc<dyn BunchProcessor>, attribute_loader: Arc<dyn AttributeLoader>) -> Self {
        Self { processor, attribute_loader }
    }
}

impl Observer for ProductInventoryObserver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn ring(&self) -> ObserverRing {
        ObserverRing::Dependent
    }

    fn requires(&self) -> &'static [&'static str] {
        &[ProductObserver::NAME]
    }
}

#[async_trait]
impl DependentObserver for ProductInventoryObserver {
    async fn execute(&self, ctx: &RowContext<'_>) -> Result<(), ObserverError> {
        let sku = ctx.sku()?;
        if ctx.has_been_processed(sku) {
            tracing::trace!("Row {}: inventory for {} already processed, skipping", ctx.row.line, sku);
            return Ok(());
        }

        let stock_status = self.prepare_stock_status(ctx)?;
        let stock_item = self.prepare_stock_item(ctx)?;

        self.processor.persist_stock_status(&stock_status).await?;
        self.processor.persist_stock_item(&stock_item).await?;

        tracing::debug!(
            "Row {}: persisted inventory for {} (stock_status={:?}, item fields={})",
            ctx.row.line,
            sku,
            stock_status.get(member::STOCK_STATUS),
            stock_item.len()
        );

        Ok(())
    }
}

impl ProductInventoryObserver {
    /// Key shared by stock status and stock item
    fn prepare_attributes(&self, ctx: &RowContext<'_>) -> Result<Map<String, Value>, ObserverError> {
        let product_id = ctx.last_entity_id().ok_or_else(|| ObserverError::MissingEntityId {
            observer: Self::NAME,
            sku: ctx.sku().unwrap_or_default().to_string(),
        })?;

        let website_id = ctx.value_or(column::WEBSITE_ID, ctx.subject.default_website_id().to_string());
        let website_id = BackendType::Int.coerce(column::WEBSITE_ID, &website_id)?;

        let mut attributes = Map::new();
        attributes.insert(member::PRODUCT_ID.to_string(), product_id.into());
        attributes.insert(member::WEBSITE_ID.to_string(), website_id);
        attributes.insert(member::STOCK_ID.to_string(), Value::from(ctx.subject.default_stock_id()));
        Ok(attributes)
    }

    /// Stock status: in stock exactly when a positive quantity is given
    fn prepare_stock_status(&self, ctx: &RowContext<'_>) -> Result<Map<String, Value>, ObserverError> {
        let mut defaults = Map::new();
        defaults.insert(member::STOCK_STATUS.to_string(), Value::from(0));

        let quantity = self.attribute_loader.load(
            ctx.row,
            &single_mapping(member::QTY, column::QTY, BackendType::Float),
        )?;

        let mut stock_status = overlay(overlay(self.prepare_attributes(ctx)?, defaults), quantity);

        let in_stock = stock_status
            .get(member::QTY)
            .and_then(Value::as_f64)
            .is_some_and(|qty| qty > 0.0);
        if in_stock {
            stock_status.insert(member::STOCK_STATUS.to_string(), Value::from(1));
        }

        Ok(stock_status)
    }

    /// Stock item: the key plus whatever the configured mapping yields
    fn prepare_stock_item(&self, ctx: &RowContext<'_>) -> Result<Map<String, Value>, ObserverError> {
        let mapped = self
            .attribute_loader
            .load(ctx.row, ctx.subject.stock_item_mappings())?;
        Ok(overlay(self.prepare_attributes(ctx)?, mapped))
    }
}

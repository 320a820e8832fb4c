// Helper functions for registering the catalog observers
use std::sync::Arc;

use super::{ProductInventoryObserver, ProductObserver};
use crate::attribute::AttributeLoader;
use crate::observer::pipeline::ObserverPipeline;
use crate::observer::traits::ObserverBox;
use crate::processor::BunchProcessor;

/// Register the product observer and its inventory dependent
pub fn register_catalog_observers(
    pipeline: &mut ObserverPipeline,
    processor: Arc<dyn BunchProcessor>,
    attribute_loader: Arc<dyn AttributeLoader>,
) {
    pipeline.register_observer(ObserverBox::Entity(Box::new(ProductObserver::new(processor.clone()))));
    pipeline.register_observer(ObserverBox::Dependent(Box::new(ProductInventoryObserver::new(
        processor,
        attribute_loader,
    ))));
}

/// Pipeline with the full product import chain registered
pub fn catalog_pipeline(
    processor: Arc<dyn BunchProcessor>,
    attribute_loader: Arc<dyn AttributeLoader>,
) -> ObserverPipeline {
    let mut pipeline = ObserverPipeline::new();
    register_catalog_observers(&mut pipeline, processor, attribute_loader);
    pipeline
}

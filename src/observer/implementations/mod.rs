// Observer implementations organized by rings
// Each ring handles a specific phase of row processing

// Ring 0: Entity - product upsert, publishes the product id
#[path = "0/product.rs"]
pub mod product;

// Ring 1: Dependent - inventory records keyed by the published id
#[path = "1/product_inventory.rs"]
pub mod product_inventory;

// Helper for registering observers (not ring-specific)
pub mod registry;
pub use registry::*;

// Ring 0 re-exports
pub use product::*;

// Ring 1 re-exports
pub use product_inventory::*;

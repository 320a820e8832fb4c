//! Names shared between the import source and the store.
//!
//! `column` holds the source column headers an import row may carry,
//! `member` the field names of the stored product and inventory records.

/// Source column headers.
pub mod column {
    pub const SKU: &str = "sku";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const PRODUCT_TYPE: &str = "product_type";
    pub const ATTRIBUTE_SET_CODE: &str = "attribute_set_code";
    pub const WEBSITE_ID: &str = "website_id";
    pub const QTY: &str = "qty";
}

/// Stored field names.
pub mod member {
    /// Internal identifier of a stored product
    pub const ENTITY_ID: &str = "entity_id";
    pub const SKU: &str = "sku";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const HAS_OPTIONS: &str = "has_options";
    pub const REQUIRED_OPTIONS: &str = "required_options";
    pub const TYPE_ID: &str = "type_id";
    pub const ATTRIBUTE_SET_ID: &str = "attribute_set_id";

    // inventory records
    pub const PRODUCT_ID: &str = "product_id";
    pub const WEBSITE_ID: &str = "website_id";
    pub const STOCK_ID: &str = "stock_id";
    pub const STOCK_STATUS: &str = "stock_status";
    pub const QTY: &str = "qty";
}

/// Fields of a loaded product that an incoming row never overwrites
pub const PRESERVED_PRODUCT_FIELDS: &[&str] = &[member::ENTITY_ID, member::SKU];

/// Default website scope for inventory records when the row names none
pub const DEFAULT_WEBSITE_ID: i64 = 0;

/// Default stock partition for inventory records
pub const DEFAULT_STOCK_ID: i64 = 1;

/// Format every stored timestamp is written in
pub const STORE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const STORE_DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

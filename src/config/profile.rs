use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ConfigError;
use crate::attribute::{AttributeMappings, BackendType, FieldMapping};
use crate::keys::{DEFAULT_STOCK_ID, DEFAULT_WEBSITE_ID};
use crate::subject::AttributeSet;

/// Source column date layout of the standard catalog export ("10/23/16, 5:10 AM")
pub const DEFAULT_SOURCE_DATE_FORMAT: &str = "%m/%d/%y, %I:%M %p";

/// Everything an import run needs to know about its source and target:
/// attribute sets, stock item columns, date layout and scope defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportProfile {
    pub source_date_format: String,
    pub default_website_id: i64,
    pub default_stock_id: i64,
    pub default_attribute_set: Option<String>,
    pub attribute_sets: BTreeMap<String, AttributeSet>,
    pub stock_item_mappings: AttributeMappings,
}

impl Default for ImportProfile {
    fn default() -> Self {
        let mut attribute_sets = BTreeMap::new();
        attribute_sets.insert(
            "Default".to_string(),
            AttributeSet {
                attribute_set_id: 4,
                attribute_set_name: "Default".to_string(),
                entity_type_id: 4,
            },
        );

        Self {
            source_date_format: DEFAULT_SOURCE_DATE_FORMAT.to_string(),
            default_website_id: DEFAULT_WEBSITE_ID,
            default_stock_id: DEFAULT_STOCK_ID,
            default_attribute_set: Some("Default".to_string()),
            attribute_sets,
            stock_item_mappings: default_stock_item_mappings(),
        }
    }
}

impl ImportProfile {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Stock item field → export column, as laid out by the standard catalog export
pub fn default_stock_item_mappings() -> AttributeMappings {
    use BackendType::{Float, Int};

    [
        ("qty", "qty", Float),
        ("min_qty", "out_of_stock_qty", Float),
        ("use_config_min_qty", "use_config_min_qty", Int),
        ("is_qty_decimal", "is_qty_decimal", Int),
        ("backorders", "allow_backorders", Int),
        ("use_config_backorders", "use_config_backorders", Int),
        ("min_sale_qty", "min_cart_qty", Float),
        ("use_config_min_sale_qty", "use_config_min_sale_qty", Int),
        ("max_sale_qty", "max_cart_qty", Float),
        ("use_config_max_sale_qty", "use_config_max_sale_qty", Int),
        ("is_in_stock", "is_in_stock", Int),
        ("notify_stock_qty", "notify_on_stock_below", Float),
        ("use_config_notify_stock_qty", "use_config_notify_stock_qty", Int),
        ("manage_stock", "manage_stock", Int),
        ("use_config_manage_stock", "use_config_manage_stock", Int),
        ("use_config_qty_increments", "use_config_qty_increments", Int),
        ("qty_increments", "qty_increments", Float),
        ("use_config_enable_qty_inc", "use_config_enable_qty_inc", Int),
        ("enable_qty_increments", "enable_qty_increments", Int),
        ("is_decimal_divided", "is_decimal_divided", Int),
    ]
    .into_iter()
    .map(|(target, column, backend)| (target.to_string(), FieldMapping::new(column, backend)))
    .collect()
}

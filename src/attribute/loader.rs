use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::backend::{BackendType, CoercionError};
use crate::row::Row;

/// Where a target field comes from and what it is coerced to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub column: String,
    pub backend: BackendType,
}

impl FieldMapping {
    pub fn new(column: impl Into<String>, backend: BackendType) -> Self {
        Self { column: column.into(), backend }
    }
}

/// Target field → source column mapping, ordered by target field
pub type AttributeMappings = BTreeMap<String, FieldMapping>;

/// Extracts typed field values from a row according to a mapping.
///
/// Implementations must leave out targets whose column is absent and fail
/// with [`CoercionError`] when a present value does not fit its backend type.
pub trait AttributeLoader: Send + Sync {
    fn load(&self, row: &Row, mappings: &AttributeMappings) -> Result<Map<String, Value>, CoercionError>;
}

/// Default loader: reads each mapped column straight from the row
#[derive(Debug, Default, Clone)]
pub struct ColumnAttributeLoader;

impl AttributeLoader for ColumnAttributeLoader {
    fn load(&self, row: &Row, mappings: &AttributeMappings) -> Result<Map<String, Value>, CoercionError> {
        let mut attributes = Map::new();
        for (target, mapping) in mappings {
            let Some(raw) = row.value(&mapping.column) else {
                continue;
            };
            let value = mapping.backend.coerce(&mapping.column, raw)?;
            attributes.insert(target.clone(), value);
        }

        tracing::trace!(
            "Loaded {}/{} mapped attributes from row {}",
            attributes.len(), mappings.len(), row.line
        );

        Ok(attributes)
    }
}

/// Convenience for building a one-field mapping
pub fn single_mapping(target: &str, column: &str, backend: BackendType) -> AttributeMappings {
    let mut mappings = AttributeMappings::new();
    mappings.insert(target.to_string(), FieldMapping::new(column, backend));
    mappings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mappings() -> AttributeMappings {
        let mut m = AttributeMappings::new();
        m.insert("qty".into(), FieldMapping::new("qty", BackendType::Float));
        m.insert("min_qty".into(), FieldMapping::new("out_of_stock_qty", BackendType::Float));
        m.insert("manage_stock".into(), FieldMapping::new("manage_stock", BackendType::Int));
        m
    }

    #[test]
    fn maps_present_columns_to_targets() {
        let row = Row::from_pairs(1, [("qty", "3"), ("out_of_stock_qty", "1"), ("manage_stock", "")]);
        let loaded = ColumnAttributeLoader.load(&row, &mappings()).unwrap();

        assert_eq!(loaded.get("qty"), Some(&json!(3.0)));
        assert_eq!(loaded.get("min_qty"), Some(&json!(1.0)));
        assert!(!loaded.contains_key("manage_stock"));
    }

    #[test]
    fn surfaces_coercion_failures() {
        let row = Row::from_pairs(1, [("manage_stock", "sometimes")]);
        let err = ColumnAttributeLoader.load(&row, &mappings()).unwrap_err();
        assert_eq!(err.column, "manage_stock");
        assert_eq!(err.backend, BackendType::Int);
    }
}

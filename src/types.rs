/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Internal identifier assigned by the persistence layer to a stored product.
/// Stable across create and update of the same SKU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl EntityId {
    /// Read an identifier back out of a stored entity field
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(EntityId),
            Value::String(s) => s.trim().parse().ok().map(EntityId),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::from(id.0)
    }
}

/// Whether a prepared product is new to the store or overlays a stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityOperation {
    Create,
    Update,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_id_reads_numbers_and_numeric_strings() {
        assert_eq!(EntityId::from_value(&json!(42)), Some(EntityId(42)));
        assert_eq!(EntityId::from_value(&json!(" 7 ")), Some(EntityId(7)));
        assert_eq!(EntityId::from_value(&json!("abc")), None);
        assert_eq!(EntityId::from_value(&Value::Null), None);
    }
}

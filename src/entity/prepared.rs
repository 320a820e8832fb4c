use serde::Serialize;
use serde_json::{Map, Value};

use super::merge::{changed_fields, merge_entity};
use crate::keys::{member, PRESERVED_PRODUCT_FIELDS};
use crate::types::{EntityId, EntityOperation};

/// A product ready to hand to the bunch processor.
///
/// For updates the loaded entity is kept next to the merged fields so the
/// processor (and logging) can tell what actually changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedEntity {
    pub operation: EntityOperation,
    /// Stored state before the merge (None for CREATE)
    pub original: Option<Map<String, Value>>,
    /// Fields to persist
    pub fields: Map<String, Value>,
}

impl PreparedEntity {
    /// New product: the prepared attributes stand alone
    pub fn create(fields: Map<String, Value>) -> Self {
        Self {
            operation: EntityOperation::Create,
            original: None,
            fields,
        }
    }

    /// Existing product: overlay the prepared attributes on the loaded one
    pub fn update(loaded: Map<String, Value>, fresh: Map<String, Value>) -> Self {
        let fields = merge_entity(&loaded, fresh, PRESERVED_PRODUCT_FIELDS);
        Self {
            operation: EntityOperation::Update,
            original: Some(loaded),
            fields,
        }
    }

    /// Pick create or update depending on whether a stored entity was found
    pub fn from_lookup(loaded: Option<Map<String, Value>>, fresh: Map<String, Value>) -> Self {
        match loaded {
            Some(loaded) => Self::update(loaded, fresh),
            None => Self::create(fresh),
        }
    }

    pub fn sku(&self) -> Option<&str> {
        self.fields.get(member::SKU).and_then(Value::as_str)
    }

    /// Identifier of the stored entity this overlays, if any
    pub fn entity_id(&self) -> Option<EntityId> {
        self.fields.get(member::ENTITY_ID).and_then(EntityId::from_value)
    }

    pub fn is_create(&self) -> bool {
        self.operation == EntityOperation::Create
    }

    /// Fields that differ from the stored state; every field for CREATE
    pub fn changes(&self) -> Vec<String> {
        match &self.original {
            Some(original) => changed_fields(original, &self.fields),
            None => self.fields.keys().cloned().collect(),
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changes().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn lookup_miss_creates() {
        let entity = PreparedEntity::from_lookup(None, map(json!({"sku": "N1"})));
        assert!(entity.is_create());
        assert_eq!(entity.sku(), Some("N1"));
        assert_eq!(entity.entity_id(), None);
        assert_eq!(entity.changes(), vec!["sku".to_string()]);
    }

    #[test]
    fn lookup_hit_updates_and_tracks_changes() {
        let loaded = map(json!({"entity_id": 3, "sku": "E1", "type_id": "simple", "has_options": 0}));
        let fresh = map(json!({"sku": "E1", "type_id": "bundle", "has_options": 0}));

        let entity = PreparedEntity::from_lookup(Some(loaded), fresh);

        assert_eq!(entity.operation, EntityOperation::Update);
        assert_eq!(entity.entity_id(), Some(EntityId(3)));
        assert_eq!(entity.fields.get("type_id"), Some(&json!("bundle")));
        assert_eq!(entity.changes(), vec!["type_id".to_string()]);
        assert!(entity.has_changes());
    }

    #[test]
    fn identical_update_reports_no_changes() {
        let loaded = map(json!({"entity_id": 3, "sku": "E1"}));
        let entity = PreparedEntity::update(loaded, map(json!({"sku": "E1"})));
        assert!(!entity.has_changes());
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use crate::keys::column;
use crate::observer::error::ObserverError;
use crate::row::Row;
use crate::subject::{AttributeSet, BatchSubject};
use crate::types::{EntityId, EntityOperation};

/// Per-row observer context.
///
/// Created fresh for every row and dropped when the row is done, so nothing
/// published here can leak into the next row.
pub struct RowContext<'a> {
    pub row: &'a Row,
    pub subject: &'a BatchSubject,

    // Type-safe metadata storage for cross-observer communication
    metadata: HashMap<TypeId, Box<dyn Any + Send + Sync>>,

    pub start_time: Instant,
    pub executed: Vec<&'static str>,
}

/// The product stored for this row, published by the entity ring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEntity {
    pub entity_id: EntityId,
    pub sku: String,
    pub operation: EntityOperation,
}

impl<'a> RowContext<'a> {
    pub fn new(row: &'a Row, subject: &'a BatchSubject) -> Self {
        Self {
            row,
            subject,
            metadata: HashMap::new(),
            start_time: Instant::now(),
            executed: Vec::new(),
        }
    }

    /// Store typed metadata - compile-time type safety
    pub fn set_metadata<T: Send + Sync + 'static>(&mut self, data: T) {
        self.metadata.insert(TypeId::of::<T>(), Box::new(data));
    }

    /// Retrieve typed metadata - compile-time type safety
    pub fn get_metadata<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.metadata
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Check if metadata of type T exists
    pub fn has_metadata<T: Send + Sync + 'static>(&self) -> bool {
        self.metadata.contains_key(&TypeId::of::<T>())
    }

    // === Row access ===

    /// Raw column value; `None` when missing or empty
    pub fn value(&self, column: &str) -> Option<&'a str> {
        self.row.value(column)
    }

    /// Column value or the given default
    pub fn value_or(&self, column: &str, default: impl Into<String>) -> String {
        match self.row.value(column) {
            Some(value) => value.to_string(),
            None => default.into(),
        }
    }

    /// Column value passed through `formatter`, or the default as-is
    pub fn formatted_value<E>(
        &self,
        column: &str,
        default: impl Into<String>,
        formatter: impl FnOnce(&str) -> Result<String, E>,
    ) -> Result<String, ObserverError>
    where
        E: Into<ObserverError>,
    {
        match self.row.value(column) {
            Some(value) => formatter(value).map_err(Into::into),
            None => Ok(default.into()),
        }
    }

    /// The row's natural key. A missing or blank SKU is fatal for the row.
    pub fn sku(&self) -> Result<&'a str, ObserverError> {
        self.row
            .value(column::SKU)
            .map(str::trim)
            .filter(|sku| !sku.is_empty())
            .ok_or(ObserverError::MissingKey {
                line: self.row.line,
                column: column::SKU,
            })
    }

    /// Whether this row's SKU completed earlier in the batch
    pub fn has_been_processed(&self, sku: &str) -> bool {
        self.subject.has_been_processed(sku)
    }

    /// Attribute set named by the row, or the batch default
    pub fn attribute_set(&self) -> Result<&'a AttributeSet, ObserverError> {
        let code = self.row.value(column::ATTRIBUTE_SET_CODE);
        self.subject.attribute_set(code).ok_or_else(|| {
            let name = code
                .map(str::to_string)
                .or_else(|| self.subject.profile().default_attribute_set.clone())
                .unwrap_or_else(|| "<none>".to_string());
            ObserverError::UnknownAttributeSet(name)
        })
    }

    // === Entity hand-off ===

    /// Publish the product stored for this row
    pub fn publish_entity(&mut self, entity: PublishedEntity) {
        self.set_metadata(entity);
    }

    pub fn published_entity(&self) -> Option<&PublishedEntity> {
        self.get_metadata::<PublishedEntity>()
    }

    /// Identifier published earlier in this row
    pub fn last_entity_id(&self) -> Option<EntityId> {
        self.published_entity().map(|entity| entity.entity_id)
    }

    /// Get total execution time
    pub fn execution_time(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::CoercionError;
    use crate::config::ImportProfile;

    fn subject() -> BatchSubject {
        BatchSubject::new(ImportProfile::default())
    }

    #[test]
    fn sku_is_trimmed_and_required() {
        let subject = subject();
        let row = Row::from_pairs(7, [("sku", "  SKU1 ")]);
        assert_eq!(RowContext::new(&row, &subject).sku().unwrap(), "SKU1");

        let blank = Row::from_pairs(8, [("sku", "   ")]);
        assert_eq!(
            RowContext::new(&blank, &subject).sku().unwrap_err(),
            ObserverError::MissingKey { line: 8, column: "sku" }
        );

        let missing = Row::from_pairs(9, [("qty", "1")]);
        assert!(RowContext::new(&missing, &subject).sku().is_err());
    }

    #[test]
    fn value_or_defaults_missing_and_blank_columns() {
        let subject = subject();
        let row = Row::from_pairs(1, [("website_id", "2"), ("qty", "")]);
        let ctx = RowContext::new(&row, &subject);

        assert_eq!(ctx.value_or("website_id", "0"), "2");
        assert_eq!(ctx.value_or("qty", "0"), "0");
        assert_eq!(ctx.value_or("store_view_code", "admin"), "admin");
    }

    #[test]
    fn formatted_value_formats_present_values_only() {
        let subject = subject();
        let row = Row::from_pairs(1, [("created_at", "x")]);
        let ctx = RowContext::new(&row, &subject);

        let formatted = ctx
            .formatted_value("created_at", "default", |v| Ok::<_, CoercionError>(v.to_uppercase()))
            .unwrap();
        assert_eq!(formatted, "X");

        let defaulted = ctx
            .formatted_value("updated_at", "default", |v| Ok::<_, CoercionError>(v.to_uppercase()))
            .unwrap();
        assert_eq!(defaulted, "default");
    }

    #[test]
    fn published_entity_is_typed_metadata() {
        let subject = subject();
        let row = Row::from_pairs(1, [("sku", "A")]);
        let mut ctx = RowContext::new(&row, &subject);
        assert_eq!(ctx.last_entity_id(), None);

        ctx.publish_entity(PublishedEntity {
            entity_id: EntityId(5),
            sku: "A".into(),
            operation: EntityOperation::Create,
        });

        assert!(ctx.has_metadata::<PublishedEntity>());
        assert_eq!(ctx.last_entity_id(), Some(EntityId(5)));
    }

    #[test]
    fn unknown_attribute_set_names_the_code() {
        let subject = subject();
        let row = Row::from_pairs(1, [("sku", "A"), ("attribute_set_code", "Bags")]);
        let err = RowContext::new(&row, &subject).attribute_set().unwrap_err();
        assert_eq!(err, ObserverError::UnknownAttributeSet("Bags".into()));
    }
}

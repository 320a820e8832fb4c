use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::attribute::{AttributeMappings, BackendType, CoercionError};
use crate::config::ImportProfile;
use crate::keys::{STORE_DATE_FORMAT, STORE_DATE_ONLY_FORMAT};
use crate::types::EntityId;

/// Externally resolved attribute set a product is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub attribute_set_id: i64,
    pub attribute_set_name: String,
    #[serde(default = "default_entity_type_id")]
    pub entity_type_id: i64,
}

fn default_entity_type_id() -> i64 {
    4
}

/// Per-batch state shared by every row of one import run.
///
/// Observers only read it while a row is in flight; the pipeline records
/// processed SKUs once a row has completed.
pub struct BatchSubject {
    pub batch_id: Uuid,
    profile: ImportProfile,
    processed: HashSet<String>,
    sku_entity_ids: HashMap<String, EntityId>,
    clock: fn() -> DateTime<Utc>,
}

impl BatchSubject {
    pub fn new(profile: ImportProfile) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            profile,
            processed: HashSet::new(),
            sku_entity_ids: HashMap::new(),
            clock: Utc::now,
        }
    }

    /// Replace the clock used for timestamp defaults
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn profile(&self) -> &ImportProfile {
        &self.profile
    }

    // === Idempotency markers ===

    /// Whether a row with this SKU already completed earlier in the batch
    pub fn has_been_processed(&self, sku: &str) -> bool {
        self.processed.contains(sku)
    }

    /// Record a completed SKU, with the product identifier when one was published
    pub fn mark_processed(&mut self, sku: &str, entity_id: Option<EntityId>) {
        self.processed.insert(sku.to_string());
        if let Some(id) = entity_id {
            self.sku_entity_ids.insert(sku.to_string(), id);
        }
    }

    /// Identifier of a product processed earlier in the batch
    pub fn entity_id_for(&self, sku: &str) -> Option<EntityId> {
        self.sku_entity_ids.get(sku).copied()
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    // === Lookups ===

    /// Attribute set by code, falling back to the profile default
    pub fn attribute_set(&self, code: Option<&str>) -> Option<&AttributeSet> {
        let code = code.or(self.profile.default_attribute_set.as_deref())?;
        self.profile.attribute_sets.get(code)
    }

    /// Stock item field → source column mapping
    pub fn stock_item_mappings(&self) -> &AttributeMappings {
        &self.profile.stock_item_mappings
    }

    pub fn default_website_id(&self) -> i64 {
        self.profile.default_website_id
    }

    pub fn default_stock_id(&self) -> i64 {
        self.profile.default_stock_id
    }

    // === Dates ===

    /// Current instant in store format
    pub fn now(&self) -> String {
        (self.clock)().naive_utc().format(STORE_DATE_FORMAT).to_string()
    }

    /// Convert a source date into store format.
    ///
    /// Accepts the profile's source format, a value already in store format,
    /// or a bare date (the date part of the source format, or `%Y-%m-%d`),
    /// which becomes midnight.
    pub fn format_date(&self, column: &str, value: &str) -> Result<String, CoercionError> {
        let value = value.trim();
        let source = self.profile.source_date_format.as_str();

        let parsed = NaiveDateTime::parse_from_str(value, source)
            .or_else(|_| NaiveDateTime::parse_from_str(value, STORE_DATE_FORMAT))
            .or_else(|_| {
                NaiveDate::parse_from_str(value, date_part(source))
                    .or_else(|_| NaiveDate::parse_from_str(value, STORE_DATE_ONLY_FORMAT))
                    .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
            });

        match parsed {
            Ok(datetime) => Ok(datetime.format(STORE_DATE_FORMAT).to_string()),
            Err(_) => Err(CoercionError {
                column: column.to_string(),
                value: value.to_string(),
                backend: BackendType::String,
            }),
        }
    }
}

/// Date fields of a datetime format: everything before the first `,` or time field
fn date_part(format: &str) -> &str {
    let end = format
        .find(',')
        .or_else(|| ["%H", "%I", "%T", "%R"].iter().filter_map(|f| format.find(f)).min())
        .unwrap_or(format.len());
    format[..end].trim_end()
}

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::attribute::ColumnAttributeLoader;
use crate::config::ImportProfile;
use crate::observer::{catalog_pipeline, ObserverPipeline};
use crate::processor::InMemoryBunchProcessor;
use crate::subject::BatchSubject;

/// 2024-03-01 12:30:00 UTC, so generated timestamps are predictable
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0)
        .single()
        .unwrap()
}

/// Batch subject with the built-in profile and a fixed clock
pub fn fixed_subject() -> BatchSubject {
    BatchSubject::new(ImportProfile::default()).with_clock(fixed_clock)
}

/// JSON object literal as a field map
pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// In-memory processor plus the full catalog pipeline over it
pub fn memory_pipeline() -> (Arc<InMemoryBunchProcessor>, ObserverPipeline) {
    let processor = Arc::new(InMemoryBunchProcessor::new());
    let pipeline = catalog_pipeline(processor.clone(), Arc::new(ColumnAttributeLoader));
    (processor, pipeline)
}

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_import::attribute::ColumnAttributeLoader;
use catalog_import::config::ImportProfile;
use catalog_import::observer::{catalog_pipeline, ObserverPipeline};
use catalog_import::processor::InMemoryBunchProcessor;
use catalog_import::row::Row;
use catalog_import::subject::BatchSubject;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

pub struct Harness {
    pub processor: Arc<InMemoryBunchProcessor>,
    pub pipeline: ObserverPipeline,
    pub subject: BatchSubject,
}

fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
}

/// Empty in-memory store, the full observer chain and a fresh batch
pub fn harness() -> Harness {
    harness_with_profile(ImportProfile::default())
}

pub fn harness_with_profile(profile: ImportProfile) -> Harness {
    let processor = Arc::new(InMemoryBunchProcessor::new());
    let pipeline = catalog_pipeline(processor.clone(), Arc::new(ColumnAttributeLoader));
    Harness {
        processor,
        pipeline,
        subject: BatchSubject::new(profile).with_clock(fixed_clock),
    }
}

/// Rows from a JSON array literal, numbered from 1
pub fn rows(value: Value) -> Result<Vec<Row>> {
    let items = value.as_array().context("rows must be a JSON array")?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| Row::from_json(index + 1, item).map_err(anyhow::Error::from))
        .collect()
}

pub fn object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => anyhow::bail!("expected a JSON object, got {}", other),
    }
}

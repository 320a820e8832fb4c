mod common;

use anyhow::{Context, Result};
use catalog_import::processor::ProcessorCall;
use catalog_import::types::EntityOperation;
use serde_json::json;

// Product ring behaviour through the full pipeline and the in-memory store.

#[tokio::test]
async fn new_sku_is_created_with_defaults() -> Result<()> {
    let mut h = common::harness();
    let rows = common::rows(json!([
        { "sku": "SKU1", "product_type": "simple", "attribute_set_code": "Default" }
    ]))?;

    let report = h.pipeline.execute_batch(&mut h.subject, rows).await?;
    assert_eq!(report.created, 1);

    let product = h.processor.product("SKU1").await.context("SKU1 not stored")?;
    assert_eq!(product["entity_id"], json!(1));
    assert_eq!(product["sku"], json!("SKU1"));
    assert_eq!(product["type_id"], json!("simple"));
    assert_eq!(product["attribute_set_id"], json!(4));
    assert_eq!(product["has_options"], json!(0));
    assert_eq!(product["required_options"], json!(0));
    assert_eq!(product["created_at"], json!("2024-03-01 12:30:00"));
    assert_eq!(product["updated_at"], json!("2024-03-01 12:30:00"));

    Ok(())
}

#[tokio::test]
async fn stored_sku_keeps_fields_the_row_does_not_mention() -> Result<()> {
    let mut h = common::harness();
    h.processor
        .seed_product(common::object(json!({
            "entity_id": 30,
            "sku": "SKU1",
            "type_id": "simple",
            "weight": "1.5",
            "created_at": "2015-06-01 08:00:00"
        }))?)
        .await?;

    let rows = common::rows(json!([
        { "sku": "SKU1", "product_type": "configurable", "updated_at": "10/23/16, 5:10 AM" }
    ]))?;
    let report = h.pipeline.execute_batch(&mut h.subject, rows).await?;
    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 0);

    let product = h.processor.product("SKU1").await.context("SKU1 not stored")?;
    assert_eq!(product["entity_id"], json!(30));
    assert_eq!(product["type_id"], json!("configurable"));
    assert_eq!(product["weight"], json!("1.5"));
    assert_eq!(product["updated_at"], json!("2016-10-23 05:10:00"));
    // no created_at in the row, so the generated timestamp wins over the stored one
    assert_eq!(product["created_at"], json!("2024-03-01 12:30:00"));
    assert_eq!(h.processor.product_count().await, 1);

    Ok(())
}

#[tokio::test]
async fn duplicate_sku_makes_no_calls() -> Result<()> {
    let mut h = common::harness();
    let rows = common::rows(json!([
        { "sku": "SKU1", "qty": 5 },
        { "sku": "SKU1", "qty": 7, "product_type": "virtual" }
    ]))?;

    let report = h.pipeline.execute_batch(&mut h.subject, rows).await?;

    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    let loads = h
        .processor
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, ProcessorCall::LoadProduct { .. }))
        .count();
    assert_eq!(loads, 1);
    let product = h.processor.product("SKU1").await.context("SKU1 not stored")?;
    assert!(product.get("type_id").is_none());

    Ok(())
}

#[tokio::test]
async fn every_row_reports_its_own_entity() -> Result<()> {
    let mut h = common::harness();

    for (line, sku) in [(1, "A"), (2, "B"), (3, "C")] {
        let row = catalog_import::row::Row::from_pairs(line, [("sku", sku)]);
        let outcome = h.pipeline.execute_row(&mut h.subject, &row).await?;
        assert_eq!(outcome.sku, sku);
        assert_eq!(
            outcome.status,
            catalog_import::observer::RowStatus::Processed {
                entity_id: Some(catalog_import::types::EntityId(line as i64)),
                operation: Some(EntityOperation::Create),
            }
        );
    }
    assert_eq!(h.subject.processed_count(), 3);

    Ok(())
}

#[tokio::test]
async fn missing_sku_stops_the_batch_at_its_line() -> Result<()> {
    let mut h = common::harness();
    let rows = common::rows(json!([
        { "sku": "SKU1" },
        { "product_type": "simple" },
        { "sku": "SKU3" }
    ]))?;

    let err = h
        .pipeline
        .execute_batch(&mut h.subject, rows)
        .await
        .expect_err("row 2 has no sku");

    assert_eq!(err.to_string(), "Row 2 failed: Row 2: missing value for key column 'sku'");
    assert!(h.processor.product("SKU1").await.is_some());
    assert!(h.processor.product("SKU3").await.is_none());

    Ok(())
}

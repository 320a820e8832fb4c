use anyhow::Context;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::attribute::ColumnAttributeLoader;
use crate::cli::utils::{output_error, output_success, read_json_array};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::observer::{catalog_pipeline, BatchReport};
use crate::processor::InMemoryBunchProcessor;
use crate::row::Row;
use crate::subject::BatchSubject;

pub struct RunArgs {
    pub rows: PathBuf,
    pub profile: Option<PathBuf>,
    pub existing: Option<PathBuf>,
}

pub async fn handle(args: RunArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let app_config = config();
    let profile = app_config
        .import_profile(args.profile.as_deref())
        .context("Failed to resolve import profile")?;

    let processor = Arc::new(InMemoryBunchProcessor::new());
    if let Some(existing) = &args.existing {
        let seeded = seed_products(&processor, existing).await?;
        tracing::info!("Seeded {} existing products from {}", seeded, existing.display());
    }

    let rows = load_rows(&args.rows)?;
    let pipeline = catalog_pipeline(processor.clone(), Arc::new(ColumnAttributeLoader))
        .with_skipped_row_logging(app_config.logging.log_skipped_rows);
    let mut subject = BatchSubject::new(profile);

    match pipeline.execute_batch(&mut subject, rows).await {
        Ok(report) => {
            let data = match output_format {
                OutputFormat::Json => Some(json!({
                    "report": serde_json::to_value(&report)?,
                    "store": processor.snapshot().await,
                })),
                OutputFormat::Text => None,
            };
            output_success(&output_format, &summary(&report), data)
        }
        Err(error) => {
            output_error(&output_format, &error.to_string(), Some("import_failed"))?;
            Err(error).context(format!("Import of {} failed", args.rows.display()))
        }
    }
}

/// Rows numbered from 1 in file order
fn load_rows(path: &Path) -> anyhow::Result<Vec<Row>> {
    read_json_array(path)?
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Row::from_json(index + 1, value).with_context(|| format!("Invalid row in {}", path.display()))
        })
        .collect()
}

async fn seed_products(processor: &InMemoryBunchProcessor, path: &Path) -> anyhow::Result<usize> {
    let products = read_json_array(path)?;
    let count = products.len();
    for product in products {
        match product {
            Value::Object(fields) => {
                processor
                    .seed_product(fields)
                    .await
                    .with_context(|| format!("Invalid product in {}", path.display()))?;
            }
            other => anyhow::bail!("Expected product objects in {}, found {}", path.display(), other),
        }
    }
    Ok(count)
}

fn summary(report: &BatchReport) -> String {
    format!(
        "Imported {} rows: {} processed ({} created, {} updated), {} skipped in {:?}",
        report.rows, report.processed, report.created, report.updated, report.skipped, report.execution_time
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rows_are_numbered_from_one() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"sku": "A", "qty": 2}}, {{"sku": "B"}}]"#).unwrap();

        let rows = load_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].value("qty"), Some("2"));
        assert_eq!(rows[1].line, 2);
    }

    #[tokio::test]
    async fn existing_products_are_seeded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"entity_id": 7, "sku": "A"}}]"#).unwrap();
        let processor = InMemoryBunchProcessor::new();

        assert_eq!(seed_products(&processor, file.path()).await.unwrap(), 1);
        assert_eq!(processor.product("A").await.unwrap()["entity_id"], json!(7));
    }
}

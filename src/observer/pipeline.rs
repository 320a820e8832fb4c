// Observer pipeline with declared ordering
// Runs every registered observer for one row, ring by ring, then records the row's SKU.

use serde::Serialize;
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::keys::column;
use crate::observer::context::RowContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{ObserverBox, ObserverRing};
use crate::row::Row;
use crate::subject::BatchSubject;
use crate::types::{EntityId, EntityOperation};

/// What happened to one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    /// First occurrence of the SKU; observers ran
    Processed {
        entity_id: Option<EntityId>,
        operation: Option<EntityOperation>,
    },
    /// SKU already processed earlier in the batch
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub line: usize,
    pub sku: String,
    pub status: RowStatus,
    pub observers_executed: Vec<&'static str>,
    pub execution_time: Duration,
}

/// Totals for one import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub rows: usize,
    pub processed: usize,
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub execution_time: Duration,
}

impl BatchReport {
    fn record(&mut self, outcome: &RowOutcome) {
        self.rows += 1;
        match &outcome.status {
            RowStatus::Skipped => self.skipped += 1,
            RowStatus::Processed { operation, .. } => {
                self.processed += 1;
                match operation {
                    Some(EntityOperation::Create) => self.created += 1,
                    Some(EntityOperation::Update) => self.updated += 1,
                    None => {}
                }
            }
        }
    }
}

/// Observer pipeline: observers run ordered by ring, then priority, then
/// registration order. Declared requirements are checked against that order
/// before any row is touched.
pub struct ObserverPipeline {
    observers: Vec<ObserverBox>,
    log_skipped_rows: bool,
    // ordering check, computed once per registered set
    validated: OnceLock<Result<(), ObserverError>>,
}

impl ObserverPipeline {
    /// Create new observer pipeline with empty observer registry
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            log_skipped_rows: true,
            validated: OnceLock::new(),
        }
    }

    pub fn with_skipped_row_logging(mut self, enabled: bool) -> Self {
        self.log_skipped_rows = enabled;
        self
    }

    /// Register an observer; the execution order is kept sorted
    pub fn register_observer(&mut self, observer: ObserverBox) {
        let ring = observer.ring();
        let name = observer.name();
        self.observers.push(observer);
        // stable sort keeps registration order inside equal (ring, priority)
        self.observers.sort_by_key(|o| (o.ring(), o.priority()));
        self.validated = OnceLock::new();

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    /// Observer names in execution order
    pub fn execution_order(&self) -> Vec<&'static str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Check that every declared requirement is scheduled before its dependent.
    /// The result is kept until the next registration.
    pub fn validate(&self) -> Result<(), ObserverError> {
        self.validated.get_or_init(|| self.check_order()).clone()
    }

    fn check_order(&self) -> Result<(), ObserverError> {
        for (position, observer) in self.observers.iter().enumerate() {
            for &required in observer.requires() {
                let scheduled_before = self.observers[..position].iter().any(|o| o.name() == required);
                if !scheduled_before {
                    return Err(ObserverError::Ordering {
                        observer: observer.name(),
                        requires: required,
                    });
                }
            }
        }
        Ok(())
    }

    /// Run every observer for one row, then mark its SKU processed.
    ///
    /// A row whose SKU was already processed is reported as skipped; the
    /// observers still run so their own guards decide, but none of them touch
    /// the processor. A failing row is not marked, so a later occurrence of
    /// the SKU is tried again.
    pub async fn execute_row(&self, subject: &mut BatchSubject, row: &Row) -> Result<RowOutcome, ObserverError> {
        self.validate()?;

        let (sku, skipped, published, executed, execution_time) = {
            let mut ctx = RowContext::new(row, subject);
            let sku = ctx.sku()?.to_string();
            let skipped = ctx.has_been_processed(&sku);

            for ring in ObserverRing::all() {
                self.execute_ring(ring, &mut ctx).await?;
            }

            let published = ctx.published_entity().cloned();
            let execution_time = ctx.execution_time();
            (sku, skipped, published, ctx.executed, execution_time)
        };

        let status = if skipped {
            if self.log_skipped_rows {
                tracing::debug!("Row {}: SKU {} already processed in this batch", row.line, sku);
            }
            RowStatus::Skipped
        } else {
            subject.mark_processed(&sku, published.as_ref().map(|p| p.entity_id));
            RowStatus::Processed {
                entity_id: published.as_ref().map(|p| p.entity_id),
                operation: published.as_ref().map(|p| p.operation),
            }
        };

        Ok(RowOutcome {
            line: row.line,
            sku,
            status,
            observers_executed: executed,
            execution_time,
        })
    }

    /// Run rows in order, stopping at the first failure
    pub async fn execute_batch<I>(&self, subject: &mut BatchSubject, rows: I) -> Result<BatchReport, ObserverError>
    where
        I: IntoIterator<Item = Row>,
    {
        self.validate()?;

        let start_time = Instant::now();
        let mut report = BatchReport {
            batch_id: subject.batch_id,
            ..BatchReport::default()
        };

        tracing::info!(
            "Import batch {} starting: observers={:?}",
            subject.batch_id,
            self.execution_order()
        );

        for row in rows {
            match self.execute_row(subject, &row).await {
                Ok(outcome) => report.record(&outcome),
                Err(error) => {
                    tracing::warn!(
                        "Import batch {} stopped at row {} (sku={:?}): {}",
                        subject.batch_id,
                        row.line,
                        row.value(column::SKU),
                        error
                    );
                    return Err(error.at_line(row.line));
                }
            }
        }

        report.execution_time = start_time.elapsed();

        tracing::info!(
            "Import batch {} completed: {} rows, {} processed ({} created, {} updated), {} skipped in {:?}",
            report.batch_id,
            report.rows,
            report.processed,
            report.created,
            report.updated,
            report.skipped,
            report.execution_time
        );

        Ok(report)
    }

    /// Execute observers in a specific ring
    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut RowContext<'_>) -> Result<(), ObserverError> {
        for observer in self.observers.iter().filter(|o| o.ring() == ring) {
            let observer_start = Instant::now();

            match observer.execute(ctx).await {
                Ok(()) => {
                    tracing::trace!(
                        "Observer: {} completed for row {} in {:?}",
                        observer.name(),
                        ctx.row.line,
                        observer_start.elapsed()
                    );
                    ctx.executed.push(observer.name());
                }
                Err(error) => {
                    tracing::debug!(
                        "Observer: {} failed for row {} in {:?}: {}",
                        observer.name(),
                        ctx.row.line,
                        observer_start.elapsed(),
                        error
                    );
                    return Err(error);
                }
            }
        }

        Ok(())
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}

//! Sequential create-then-insert executor

use std::sync::Arc;

use tracing::{info, warn};

use super::progress::{CancellationFlag, Progress, ProgressReporter};
use super::run::{IngestionRun, Phase};
use super::IngestError;
use crate::batch::{self, BATCH_SIZE};
use crate::database::{QueryEngine, SchemaCatalog};
use crate::export::{DdlBuilder, InsertBuilder, SqlDialect};
use crate::models::{ParsedDataset, TableSpec};
use crate::validation::TableValidator;

/// Drives one upload: validate, create the table, insert every batch.
///
/// Batches run strictly one after another; the first failure stops the run.
/// Nothing is rolled back: a failed insert leaves the table and every earlier
/// batch in place, and `completed_batches` says how far it got.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use table_upload_sdk::database::{CatalogSnapshot, HttpQueryEngine, UploadConfig};
/// use table_upload_sdk::ingest::{IngestionExecutor, Progress};
/// # use table_upload_sdk::models::{ParsedDataset, TableSpec};
/// # type BoxError = Box<dyn std::error::Error>;
/// # async fn run(spec: TableSpec, dataset: ParsedDataset) -> Result<(), BoxError> {
/// let config = UploadConfig::new();
/// let engine = Arc::new(HttpQueryEngine::new(&config.engine)?);
/// let mut executor = IngestionExecutor::new(engine, Arc::new(CatalogSnapshot::new()));
/// executor
///     .execute(&spec, &dataset, |p: Progress| println!("{}%", p.percent))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct IngestionExecutor {
    engine: Arc<dyn QueryEngine>,
    catalog: Arc<dyn SchemaCatalog>,
    dialect: SqlDialect,
    batch_size: usize,
    cancel: CancellationFlag,
    run: IngestionRun,
}

impl IngestionExecutor {
    pub fn new(engine: Arc<dyn QueryEngine>, catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self {
            engine,
            catalog,
            dialect: SqlDialect::default(),
            batch_size: BATCH_SIZE,
            cancel: CancellationFlag::new(),
            run: IngestionRun::new(),
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Rows per INSERT statement. Zero is rejected when the run starts.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Flag that cancels the current run when set
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn run(&self) -> &IngestionRun {
        &self.run
    }

    pub fn phase(&self) -> Phase {
        self.run.phase()
    }

    /// Return to `Idle` after a finished or failed run. Clears the
    /// cancellation flag.
    pub fn reset(&mut self) {
        self.run.reset();
        self.cancel.clear();
    }

    /// Validate the table spec, create the table and insert every batch.
    ///
    /// Validation errors leave the executor in `Idle`. Any later failure
    /// leaves it in a terminal phase with the engine's message in
    /// [`IngestionRun::last_error`]; call [`IngestionExecutor::reset`] before
    /// retrying.
    pub async fn execute(
        &mut self,
        spec: &TableSpec,
        dataset: &ParsedDataset,
        mut reporter: impl ProgressReporter,
    ) -> Result<(), IngestError> {
        if self.run.phase() != Phase::Idle {
            return Err(IngestError::NotIdle(self.run.phase()));
        }
        let total = batch::batch_count(dataset.row_count(), self.batch_size)?;

        let report = TableValidator::new().validate(spec, Some(self.catalog.as_ref()));
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        if !report.is_valid() {
            warn!(
                "Validation of {}.{} failed with {} errors",
                spec.namespace,
                spec.table_name,
                report.errors.len()
            );
            return Err(IngestError::Validation(report));
        }
        self.run.transition(Phase::Validated)?;

        self.run.transition(Phase::CreatingTable)?;
        if self.cancel.is_cancelled() {
            return self.cancelled();
        }
        let ddl = DdlBuilder::new(self.dialect).build(spec);
        info!(
            "Run {}: creating {}.{}",
            self.run.run_id(),
            spec.namespace,
            spec.table_name
        );
        if let Err(e) = self.engine.execute(&ddl).await {
            let message = e.to_string();
            warn!("Run {}: table creation failed: {}", self.run.run_id(), message);
            self.run.record_failure(message.clone(), None);
            self.run.transition(Phase::CreateFailed)?;
            return Err(IngestError::CreateFailed(message));
        }

        let batches = batch::plan(dataset.rows(), self.batch_size)?;
        self.run.transition(Phase::Inserting)?;
        self.run.set_total_batches(total);
        reporter.report(Progress::new(0, total));

        let insert = InsertBuilder::new(self.dialect);
        for batch in batches {
            if self.cancel.is_cancelled() {
                return self.cancelled();
            }
            let sql = insert.build(spec, batch.rows);
            match self.engine.execute(&sql).await {
                Ok(_) => {
                    self.run.complete_batch();
                    info!(
                        "Run {}: batch {}/{} inserted ({} rows)",
                        self.run.run_id(),
                        batch.index + 1,
                        total,
                        batch.len()
                    );
                    reporter.report(Progress::new(self.run.completed_batches(), total));
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(
                        "Run {}: batch {}/{} failed: {}",
                        self.run.run_id(),
                        batch.index + 1,
                        total,
                        message
                    );
                    self.run.record_failure(message.clone(), Some(batch.index));
                    self.run.transition(Phase::InsertFailed)?;
                    return Err(IngestError::InsertFailed {
                        batch_index: batch.index,
                        completed_batches: self.run.completed_batches(),
                        total_batches: total,
                        message,
                    });
                }
            }
        }

        self.run.transition(Phase::Completed)?;
        info!(
            "Run {}: completed {} batches ({} rows) in {}",
            self.run.run_id(),
            total,
            dataset.row_count(),
            self.run.duration_string()
        );
        Ok(())
    }

    fn cancelled(&mut self) -> Result<(), IngestError> {
        self.run.transition(Phase::Cancelled)?;
        info!(
            "Run {}: cancelled after {} of {} batches",
            self.run.run_id(),
            self.run.completed_batches(),
            self.run.total_batches()
        );
        Err(IngestError::Cancelled {
            completed_batches: self.run.completed_batches(),
            total_batches: self.run.total_batches(),
        })
    }
}

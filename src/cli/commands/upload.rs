//! Upload CLI command
//!
//! Creates the target table and inserts the file in batches through the
//! configured HTTP endpoint, with a progress bar on stderr.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use super::{SchemaArgs, SourceArgs, apply_schema_args, load_config, open_session};
use crate::cli::error::CliError;
use crate::database::{CatalogSnapshot, HttpQueryEngine};
use crate::ingest::{IngestError, IngestionExecutor, IngestionRun, Progress};

/// Upload command arguments
#[derive(Debug, Clone)]
pub struct UploadArgs {
    pub source: SourceArgs,
    pub schema: SchemaArgs,
    /// Rows per INSERT, overriding the configured batch size
    pub batch_size: Option<usize>,
    /// Print the SQL instead of running it
    pub dry_run: bool,
}

/// Handle the upload command
pub fn handle_upload(args: &UploadArgs) -> Result<(), CliError> {
    let mut config = load_config(args.source.config.as_deref())?;
    if let Some(batch_size) = args.batch_size {
        if batch_size == 0 {
            return Err(CliError::InvalidArgument(
                "--batch-size must be greater than zero".to_string(),
            ));
        }
        config.ingest.batch_size = batch_size;
    }

    let mut session = open_session(&args.source, &config)?;
    if let Some(spec) = session.spec_mut() {
        apply_schema_args(spec, &args.schema)?;
    }
    let (Some(spec), Some(dataset)) = (session.spec(), session.dataset()) else {
        return Err(CliError::InvalidArgument("No file loaded".to_string()));
    };

    if args.dry_run {
        let report = session.validate(None).unwrap_or_default();
        for warning in &report.warnings {
            eprintln!("warning: {}", warning);
        }
        if !report.is_valid() {
            return Err(CliError::ValidationFailed(report.to_string()));
        }
        if let Some(ddl) = session.preview_ddl() {
            println!("{};", ddl);
        }
        if let Some(insert) = session.preview_insert() {
            println!("{};", insert);
        }
        return Ok(());
    }

    let engine = Arc::new(HttpQueryEngine::new(&config.engine)?);
    let batch_size = session.batch_size();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::IoError(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(async {
        let catalog = if spec.if_not_exists {
            CatalogSnapshot::new()
        } else {
            CatalogSnapshot::load(engine.as_ref(), &spec.namespace).await?
        };

        let mut executor = IngestionExecutor::new(engine.clone(), Arc::new(catalog))
            .with_batch_size(batch_size);

        let bar = progress_bar(dataset.row_count().div_ceil(batch_size) as u64);
        let result = executor
            .execute(spec, dataset, |p: Progress| {
                bar.set_length(p.total_batches as u64);
                bar.set_position(p.completed_batches as u64);
            })
            .await;

        match result {
            Ok(()) => {
                bar.finish_with_message("done");
                print_summary(executor.run(), &spec.namespace, &spec.table_name);
                Ok(())
            }
            Err(IngestError::Validation(report)) => {
                bar.finish_and_clear();
                Err(CliError::ValidationFailed(report.to_string()))
            }
            Err(e) => {
                bar.abandon_with_message("failed");
                print_summary(executor.run(), &spec.namespace, &spec.table_name);
                Err(CliError::IngestError(e))
            }
        }
    })
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template =
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}";
    match ProgressStyle::default_bar().template(template) {
        Ok(style) => bar.set_style(style.progress_chars("=>-")),
        Err(e) => warn!("Invalid progress template: {}", e),
    }
    bar
}

fn print_summary(run: &IngestionRun, namespace: &str, table: &str) {
    eprintln!("Run {}: {}", run.run_id(), run.phase());
    eprintln!("  Table:    {}.{}", namespace, table);
    eprintln!(
        "  Batches:  {}/{} ({}%)",
        run.completed_batches(),
        run.total_batches(),
        run.percent()
    );
    eprintln!("  Duration: {}", run.duration_string());
    if let Some(error) = run.last_error() {
        eprintln!("  Error:    {}", error);
    }
}

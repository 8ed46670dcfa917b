//! CLI binary entry point for table-upload

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use table_upload_sdk::cli::commands::init_config::{InitConfigArgs, handle_init_config};
#[cfg(feature = "cli")]
use table_upload_sdk::cli::commands::preview::{PreviewArgs, handle_preview};
#[cfg(feature = "cli")]
use table_upload_sdk::cli::commands::upload::{UploadArgs, handle_upload};
#[cfg(feature = "cli")]
use table_upload_sdk::cli::commands::{SchemaArgs, SourceArgs};
#[cfg(feature = "cli")]
use table_upload_sdk::cli::output::OutputFormat;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "table-upload")]
#[command(about = "Upload CSV and JSON files into analytical database tables")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Show the inferred schema, sample rows and generated SQL for a file
    Preview {
        #[command(flatten)]
        source: SourceOpts,
        #[command(flatten)]
        schema: SchemaOpts,
        /// Sample rows to show
        #[arg(long, default_value = "10")]
        rows: usize,
        /// Output format for schema and sample
        #[arg(short, long, value_enum, default_value = "table")]
        output: OutputFormat,
    },
    /// Create the table and insert the file in batches
    Upload {
        #[command(flatten)]
        source: SourceOpts,
        #[command(flatten)]
        schema: SchemaOpts,
        /// Rows per INSERT statement
        #[arg(long)]
        batch_size: Option<usize>,
        /// Print the SQL without running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a sample .table-upload.toml
    InitConfig {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    Csv,
    Tsv,
    Json,
    Jsonl,
}

#[cfg(feature = "cli")]
impl FormatArg {
    fn name(&self) -> &'static str {
        match self {
            FormatArg::Csv => "csv",
            FormatArg::Tsv => "tsv",
            FormatArg::Json => "json",
            FormatArg::Jsonl => "jsonl",
        }
    }
}

#[cfg(feature = "cli")]
#[derive(clap::Args)]
struct SourceOpts {
    /// File to upload
    file: PathBuf,
    /// Input format (detected from extension and content when omitted)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
    /// Target database (default: from config)
    #[arg(short, long)]
    namespace: Option<String>,
    /// Target table (default: file name)
    #[arg(short, long)]
    table: Option<String>,
    /// CSV delimiter
    #[arg(short, long)]
    delimiter: Option<char>,
    /// CSV rows to skip after the header
    #[arg(long)]
    skip_rows: Option<usize>,
    /// Flatten nested JSON objects into dotted column names
    #[arg(long)]
    flatten: bool,
    /// JSON path to extract as a column (repeatable)
    #[arg(long = "path")]
    paths: Vec<String>,
    /// Rows sampled for type inference
    #[arg(long)]
    sample_size: Option<usize>,
    /// Config file (default: ./.table-upload.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[cfg(feature = "cli")]
impl From<SourceOpts> for SourceArgs {
    fn from(opts: SourceOpts) -> Self {
        SourceArgs {
            file: opts.file,
            format: opts.format.map(|f| f.name().to_string()),
            namespace: opts.namespace,
            table: opts.table,
            delimiter: opts.delimiter,
            skip_rows: opts.skip_rows,
            flatten: opts.flatten,
            paths: opts.paths,
            sample_size: opts.sample_size,
            config: opts.config,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(clap::Args)]
struct SchemaOpts {
    /// Override a column type, e.g. `price=Decimal(18, 2)` (repeatable)
    #[arg(long = "type", value_name = "NAME=TYPE")]
    types: Vec<String>,
    /// Mark a column NOT NULL (repeatable)
    #[arg(long)]
    not_null: Vec<String>,
    /// ORDER BY columns, comma separated
    #[arg(long, value_delimiter = ',')]
    order_by: Vec<String>,
    /// PRIMARY KEY columns, comma separated
    #[arg(long, value_delimiter = ',')]
    primary_key: Vec<String>,
    /// Date or date/time column to partition by month
    #[arg(long)]
    partition_by: Option<String>,
    /// Table engine (default: from config)
    #[arg(long)]
    engine: Option<String>,
    /// Table comment
    #[arg(long)]
    comment: Option<String>,
    /// Emit IF NOT EXISTS and skip the existing-table check
    #[arg(long)]
    if_not_exists: bool,
}

#[cfg(feature = "cli")]
impl From<SchemaOpts> for SchemaArgs {
    fn from(opts: SchemaOpts) -> Self {
        SchemaArgs {
            types: opts.types,
            not_null: opts.not_null,
            order_by: opts.order_by,
            primary_key: opts.primary_key,
            partition_by: opts.partition_by,
            engine: opts.engine,
            comment: opts.comment,
            if_not_exists: opts.if_not_exists,
        }
    }
}

#[cfg(feature = "cli")]
fn setup_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "table_upload_sdk=debug,warn"
    } else {
        "table_upload_sdk=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Preview {
            source,
            schema,
            rows,
            output,
        } => {
            let args = PreviewArgs {
                source: source.into(),
                schema: schema.into(),
                rows,
                output,
            };
            handle_preview(&args)
        }
        Commands::Upload {
            source,
            schema,
            batch_size,
            dry_run,
        } => {
            let args = UploadArgs {
                source: source.into(),
                schema: schema.into(),
                batch_size,
                dry_run,
            };
            handle_upload(&args)
        }
        Commands::InitConfig { dir, force } => {
            let args = InitConfigArgs { dir, force };
            handle_init_config(&args)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}

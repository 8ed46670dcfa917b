//! Upload session
//!
//! Holds the state of one upload attempt between loading a file and running
//! the executor: the parsed dataset and the editable table spec.

use std::path::Path;

use tracing::info;

use crate::batch::BATCH_SIZE;
use crate::database::{SchemaCatalog, UploadConfig};
use crate::export::{DdlBuilder, InsertBuilder, SqlDialect};
use crate::import::{ImportFormat, ImportResult, SourceFile};
use crate::inference::{DEFAULT_SAMPLE_SIZE, infer_fields};
use crate::models::{DEFAULT_ENGINE, ParsedDataset, TableSpec};
use crate::validation::{TableValidator, ValidationReport};

/// One file-to-table upload in progress.
///
/// # Example
///
/// ```rust
/// use table_upload_sdk::import::{CsvOptions, ImportFormat};
/// use table_upload_sdk::session::UploadSession;
///
/// let mut session = UploadSession::new("db");
/// session
///     .load_str("id,name\n1,ann\n", &ImportFormat::Csv(CsvOptions::default()), "people")
///     .unwrap();
/// session.spec_mut().unwrap().set_order_by("id", true).unwrap();
/// assert!(session.preview_ddl().unwrap().starts_with("CREATE TABLE db.people ("));
/// ```
#[derive(Debug, Clone)]
pub struct UploadSession {
    namespace: String,
    engine: String,
    if_not_exists: bool,
    sample_size: usize,
    batch_size: usize,
    dialect: SqlDialect,
    source: Option<SourceFile>,
    dataset: Option<ParsedDataset>,
    spec: Option<TableSpec>,
}

impl UploadSession {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            engine: DEFAULT_ENGINE.to_string(),
            if_not_exists: false,
            sample_size: DEFAULT_SAMPLE_SIZE,
            batch_size: BATCH_SIZE,
            dialect: SqlDialect::default(),
            source: None,
            dataset: None,
            spec: None,
        }
    }

    /// Session using the configured database and ingest defaults
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            engine: config.ingest.engine.clone(),
            if_not_exists: config.ingest.if_not_exists,
            sample_size: config.ingest.sample_size,
            batch_size: config.ingest.batch_size,
            ..Self::new(config.engine.database.clone())
        }
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Read a file, parse it and infer the initial table spec. The format is
    /// detected when not given; the table is named after the file.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        format: Option<ImportFormat>,
    ) -> ImportResult<&TableSpec> {
        let path = path.as_ref();
        let source = SourceFile::read(path)?;
        let format = format.unwrap_or_else(|| source.detect_format());
        let table_name = default_table_name(path);
        self.load_source(source, &format, table_name)
    }

    /// Parse in-memory content as a file named `table_name`
    pub fn load_str(
        &mut self,
        content: &str,
        format: &ImportFormat,
        table_name: impl Into<String>,
    ) -> ImportResult<&TableSpec> {
        self.load_source(SourceFile::from_string(content), format, table_name.into())
    }

    /// Parse an already loaded file and infer the initial table spec. On a
    /// parse error the previous file and spec are kept.
    pub fn load_source(
        &mut self,
        source: SourceFile,
        format: &ImportFormat,
        table_name: impl Into<String>,
    ) -> ImportResult<&TableSpec> {
        let dataset = source.parse(format)?;
        let fields = infer_fields(&dataset, self.sample_size);
        info!(
            "Loaded {} rows with {} columns as {} ({})",
            dataset.row_count(),
            dataset.column_count(),
            format.name(),
            source.content_hash
        );

        let spec = TableSpec::new(self.namespace.clone(), table_name.into(), fields)
            .with_engine(self.engine.clone())
            .if_not_exists(self.if_not_exists);

        self.source = Some(source);
        self.dataset = Some(dataset);
        Ok(&*self.spec.insert(spec))
    }

    pub fn source(&self) -> Option<&SourceFile> {
        self.source.as_ref()
    }

    pub fn dataset(&self) -> Option<&ParsedDataset> {
        self.dataset.as_ref()
    }

    pub fn spec(&self) -> Option<&TableSpec> {
        self.spec.as_ref()
    }

    /// Editable table spec of the loaded file
    pub fn spec_mut(&mut self) -> Option<&mut TableSpec> {
        self.spec.as_mut()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn validate(&self, catalog: Option<&dyn SchemaCatalog>) -> Option<ValidationReport> {
        self.spec
            .as_ref()
            .map(|spec| TableValidator::new().validate(spec, catalog))
    }

    /// `CREATE TABLE` statement for the current spec
    pub fn preview_ddl(&self) -> Option<String> {
        self.spec
            .as_ref()
            .map(|spec| DdlBuilder::new(self.dialect).build(spec))
    }

    /// `INSERT` statement of the first batch, if there are any rows
    pub fn preview_insert(&self) -> Option<String> {
        let spec = self.spec.as_ref()?;
        let dataset = self.dataset.as_ref()?;
        if dataset.is_empty() {
            return None;
        }
        let rows = dataset.sample(self.batch_size.max(1));
        Some(InsertBuilder::new(self.dialect).build(spec, rows))
    }

    /// Drop the loaded file and spec
    pub fn reset(&mut self) {
        self.source = None;
        self.dataset = None;
        self.spec = None;
    }
}

/// Table name derived from a file name: the stem, lowercased, with every
/// character outside `[a-z0-9_]` replaced by `_`.
pub fn default_table_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let mut name: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        name = "upload".to_string();
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

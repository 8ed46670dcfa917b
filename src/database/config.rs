//! Upload configuration file support
//!
//! Handles parsing of `.table-upload.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::{DatabaseError, DatabaseResult};
use crate::batch::BATCH_SIZE;
use crate::import::CsvOptions;
use crate::inference::DEFAULT_SAMPLE_SIZE;
use crate::models::DEFAULT_ENGINE;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".table-upload.toml";

/// Environment variable for the engine URL
pub const ENV_URL: &str = "TABLE_UPLOAD_URL";

/// Environment variable for the engine user
pub const ENV_USER: &str = "TABLE_UPLOAD_USER";

/// Environment variable for the engine password
pub const ENV_PASSWORD: &str = "TABLE_UPLOAD_PASSWORD";

/// Environment variable for the default target database
pub const ENV_DATABASE: &str = "TABLE_UPLOAD_DATABASE";

/// Environment variable for the batch size
pub const ENV_BATCH_SIZE: &str = "TABLE_UPLOAD_BATCH_SIZE";

/// Query engine connection section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// HTTP endpoint of the engine
    pub url: String,
    pub user: String,
    /// Password; usually supplied through the environment instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Default target database
    pub database: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            user: "default".to_string(),
            password: None,
            database: "default".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Ingestion settings section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Rows per INSERT statement
    pub batch_size: usize,
    /// Rows sampled for type inference
    pub sample_size: usize,
    /// Table engine for new tables
    pub engine: String,
    /// Emit `IF NOT EXISTS` by default
    pub if_not_exists: bool,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            engine: DEFAULT_ENGINE.to_string(),
            if_not_exists: false,
        }
    }
}

/// Main configuration structure
///
/// Represents the `.table-upload.toml` configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Engine connection
    #[serde(default)]
    pub engine: EngineSection,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: IngestSection,

    /// Default CSV options
    #[serde(default)]
    pub csv: CsvOptions,
}

impl UploadConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.table-upload.toml` in the directory. Falls back to
    /// defaults if not found. Environment overrides are applied either way.
    pub fn load(dir: &Path) -> DatabaseResult<Self> {
        Self::load_with(dir, env_var)
    }

    /// [`UploadConfig::load`] with overrides taken from `lookup` instead of
    /// the process environment
    pub fn load_with(
        dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DatabaseResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::read(&config_path)?
        } else {
            debug!("No {} in {}, using defaults", CONFIG_FILENAME, dir.display());
            Self::default()
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    /// Load configuration from an explicit file path
    pub fn load_file(path: &Path) -> DatabaseResult<Self> {
        Self::load_file_with(path, env_var)
    }

    /// [`UploadConfig::load_file`] with overrides taken from `lookup`
    pub fn load_file_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DatabaseResult<Self> {
        let mut config = Self::read(path)?;
        config.apply_overrides(lookup);
        Ok(config)
    }

    fn read(path: &Path) -> DatabaseResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DatabaseError::IoError(format!("Failed to read config: {}", e)))?;
        info!("Loaded configuration from {}", path.display());
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> DatabaseResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DatabaseError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> DatabaseResult<()> {
        if self.ingest.batch_size == 0 {
            return Err(DatabaseError::ConfigError(
                "ingest.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.ingest.sample_size == 0 {
            return Err(DatabaseError::ConfigError(
                "ingest.sample_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> DatabaseResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| DatabaseError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> DatabaseResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            DatabaseError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL) {
            self.engine.url = url;
        }

        if let Some(user) = lookup(ENV_USER) {
            self.engine.user = user;
        }

        if let Some(password) = lookup(ENV_PASSWORD) {
            self.engine.password = Some(password);
        }

        if let Some(database) = lookup(ENV_DATABASE) {
            self.engine.database = database;
        }

        // Ignore unparsable or zero sizes
        if let Some(size) = lookup(ENV_BATCH_SIZE)
            && let Ok(size) = size.parse::<usize>()
            && size > 0
        {
            self.ingest.batch_size = size;
        }
    }

    /// Check if configuration exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Table upload configuration

[engine]
# HTTP endpoint of the ClickHouse-compatible engine
url = "http://localhost:8123"
user = "default"
# password = "..."   # prefer TABLE_UPLOAD_PASSWORD
database = "default"
timeout_secs = 30

[ingest]
# Rows per INSERT statement
batch_size = 100

# Rows sampled for type inference
sample_size = 100

# Engine for new tables
engine = "MergeTree"

if_not_exists = false

[csv]
delimiter = ","
quote = "\""
skip_rows = 0
trim = false
strict_columns = false
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = UploadConfig::new();
        assert_eq!(config.engine.url, "http://localhost:8123");
        assert_eq!(config.ingest.batch_size, BATCH_SIZE);
        assert_eq!(config.ingest.engine, "MergeTree");
        assert_eq!(config.csv.delimiter, ',');
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[engine]
url = "https://ch.example.com:8443"

[ingest]
batch_size = 500

[csv]
delimiter = ";"
"#;
        let config = UploadConfig::parse(toml).unwrap();
        assert_eq!(config.engine.url, "https://ch.example.com:8443");
        assert_eq!(config.engine.user, "default");
        assert_eq!(config.ingest.batch_size, 500);
        assert_eq!(config.ingest.sample_size, DEFAULT_SAMPLE_SIZE);
        assert_eq!(config.csv.delimiter, ';');
        assert_eq!(config.csv.quote, '"');
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = UploadConfig::parse("[ingest]\nbatch_size = 0\n").unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigError(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_URL, "http://override:8123"),
            (ENV_PASSWORD, "secret"),
            (ENV_BATCH_SIZE, "25"),
        ]);
        let mut config = UploadConfig::new();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.engine.url, "http://override:8123");
        assert_eq!(config.engine.password.as_deref(), Some("secret"));
        assert_eq!(config.ingest.batch_size, 25);

        let mut config = UploadConfig::new();
        config.apply_overrides(|key| (key == ENV_BATCH_SIZE).then(|| "0".to_string()));
        assert_eq!(config.ingest.batch_size, BATCH_SIZE);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut config = UploadConfig::new();
        config.ingest.sample_size = 42;

        config.save(dir.path()).unwrap();
        assert!(UploadConfig::exists(dir.path()));

        let path = dir.path().join(CONFIG_FILENAME);
        let loaded = UploadConfig::load_file_with(&path, |_| None).unwrap();
        assert_eq!(loaded.ingest.sample_size, 42);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let result = UploadConfig::parse(sample_config());
        assert!(result.is_ok(), "Sample config should be valid TOML");
    }
}

//! Configuration file tests

use std::collections::HashMap;

use table_upload_sdk::database::config::{
    CONFIG_FILENAME, ENV_BATCH_SIZE, ENV_DATABASE, ENV_PASSWORD, ENV_URL, UploadConfig,
};
use table_upload_sdk::import::{CsvOptions, ImportFormat};
use table_upload_sdk::session::UploadSession;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn test_save_and_load_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(!UploadConfig::exists(dir.path()));

    let mut config = UploadConfig::new();
    config.engine.url = "http://clickhouse:8123".to_string();
    config.ingest.batch_size = 500;
    config.csv.delimiter = ';';
    config.save(dir.path()).unwrap();
    assert!(dir.path().join(CONFIG_FILENAME).exists());

    let loaded = UploadConfig::load_with(dir.path(), no_env).unwrap();
    assert_eq!(loaded.engine.url, "http://clickhouse:8123");
    assert_eq!(loaded.ingest.batch_size, 500);
    assert_eq!(loaded.csv.delimiter, ';');
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = UploadConfig::load_with(dir.path(), no_env).unwrap();
    assert_eq!(config.ingest.sample_size, 100);
    assert_eq!(config.ingest.engine, "MergeTree");

    assert!(UploadConfig::load_file_with(&dir.path().join("absent.toml"), no_env).is_err());
}

#[test]
fn test_load_applies_injected_overrides() {
    let dir = tempfile::tempdir().unwrap();
    UploadConfig::new().save(dir.path()).unwrap();

    let config = UploadConfig::load_with(dir.path(), |key| {
        (key == ENV_URL).then(|| "http://other:8123".to_string())
    })
    .unwrap();
    assert_eq!(config.engine.url, "http://other:8123");
    assert_eq!(config.engine.database, "default");
}

#[test]
fn test_overrides_from_lookup() {
    let vars: HashMap<&str, &str> = [
        (ENV_DATABASE, "staging"),
        (ENV_PASSWORD, "secret"),
        (ENV_BATCH_SIZE, "not-a-number"),
    ]
    .into_iter()
    .collect();

    let mut config = UploadConfig::new();
    config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(config.engine.database, "staging");
    assert_eq!(config.engine.password.as_deref(), Some("secret"));
    assert_eq!(config.ingest.batch_size, 100);

    // The password never lands in a saved file unless it was set
    assert!(!UploadConfig::new().to_toml().unwrap().contains("password"));
}

#[test]
fn test_session_uses_configured_defaults() {
    let config = UploadConfig::parse(
        concat!(
            "[engine]\ndatabase = \"analytics\"\n\n",
            "[ingest]\nbatch_size = 2\nengine = \"ReplacingMergeTree\"\nif_not_exists = true\n",
        ),
    )
    .unwrap();

    let mut session = UploadSession::from_config(&config);
    session
        .load_str("a\n1\n2\n3\n", &ImportFormat::Csv(CsvOptions::default()), "t")
        .unwrap();
    assert_eq!(session.batch_size(), 2);
    assert_eq!(
        session.preview_ddl().unwrap(),
        "CREATE TABLE IF NOT EXISTS analytics.t (\n    a Int64 NULL\n) ENGINE = ReplacingMergeTree"
    );
    assert_eq!(
        session.preview_insert().unwrap(),
        "INSERT INTO analytics.t (a) VALUES (1), (2)"
    );
}

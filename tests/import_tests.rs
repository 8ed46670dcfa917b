//! File loading tests: format detection, parsing and inference from disk

use std::io::Write;

use table_upload_sdk::import::{CsvOptions, ImportError, ImportFormat, JsonOptions, SourceFile};
use table_upload_sdk::models::{CellValue, TypeTag};
use table_upload_sdk::session::UploadSession;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_tsv_file_detected_and_inferred() {
    let file = write_temp(
        ".tsv",
        concat!(
            "id\tprice\tsold_at\tnote\n",
            "1\t9.5\t2024-03-01 10:00:00\tfirst\n",
            "2\t12\t2024-03-02 11:30:00\t\n",
        ),
    );
    let source = SourceFile::read(file.path()).unwrap();
    assert!(matches!(
        source.detect_format(),
        ImportFormat::Csv(CsvOptions { delimiter: '\t', .. })
    ));

    let mut session = UploadSession::new("shop");
    let spec = session.load_file(file.path(), None).unwrap();
    let types: Vec<TypeTag> = spec.fields.iter().map(|f| f.type_tag.clone()).collect();
    assert_eq!(
        types,
        vec![TypeTag::Int64, TypeTag::Float64, TypeTag::DateTime, TypeTag::String]
    );
    assert!(spec.fields.iter().all(|f| f.nullable));
    assert_eq!(session.dataset().unwrap().rows()[1][3], CellValue::from(""));
}

#[test]
fn test_json_lines_with_flatten() {
    let file = write_temp(
        ".jsonl",
        concat!(
            "{\"id\": 1, \"user\": {\"name\": \"ann\", \"age\": 31}}\n",
            "\n",
            "{\"id\": 2, \"user\": {\"name\": \"bo\"}}\n",
        ),
    );
    let format = ImportFormat::JsonLines(JsonOptions {
        flatten: true,
        paths: None,
    });

    let mut session = UploadSession::new("db");
    let spec = session.load_file(file.path(), Some(format)).unwrap();
    let names: Vec<&str> = spec.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "user.name", "user.age"]);
    assert_eq!(spec.field("user.age").unwrap().type_tag, TypeTag::Int64);

    let dataset = session.dataset().unwrap();
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.rows()[1][2], CellValue::Null);

    // Dotted names are not plain identifiers and get quoted
    let insert = session.preview_insert().unwrap();
    assert!(insert.contains("(id, `user.name`, `user.age`)"));
}

#[test]
fn test_json_paths_take_precedence() {
    let content = r#"[
        {"order": {"id": "A-1", "total": 10.5}, "tags": ["x", "y"]},
        {"order": {"id": "A-2"}, "tags": []}
    ]"#;
    let format = ImportFormat::Json(JsonOptions {
        flatten: true,
        paths: Some(vec![
            "order.id".to_string(),
            "order.total".to_string(),
            "tags".to_string(),
        ]),
    });
    let dataset = table_upload_sdk::import::parse(content, &format).unwrap();
    assert_eq!(dataset.headers(), &["order.id", "order.total", "tags"]);
    assert_eq!(dataset.rows()[0][2], CellValue::from("[\"x\",\"y\"]"));
    assert_eq!(dataset.rows()[1][1], CellValue::Null);
}

#[test]
fn test_extension_less_file_is_sniffed() {
    let file = write_temp(".dat", "[{\"a\": true}, {\"a\": false}]");
    let mut session = UploadSession::new("db");
    let spec = session.load_file(file.path(), None).unwrap().clone();
    // Booleans never infer as numbers or dates
    assert_eq!(spec.fields[0].type_tag, TypeTag::String);
    assert_eq!(
        session.preview_insert().unwrap(),
        format!("INSERT INTO db.{} (a) VALUES ('true'), ('false')", spec.table_name)
    );
}

#[test]
fn test_bom_is_stripped_from_header() {
    let file = write_temp(".csv", "\u{feff}id,name\n1,x\n");
    let source = SourceFile::read(file.path()).unwrap();
    let dataset = source.parse(&source.detect_format()).unwrap();
    assert_eq!(dataset.headers(), &["id", "name"]);
    assert_eq!(source.content_hash.len(), 64);
}

#[test]
fn test_unreadable_inputs() {
    let missing = SourceFile::read("/nonexistent/input.csv").unwrap_err();
    assert!(matches!(missing, ImportError::IoError(_)));

    let file = write_temp(".json", "{\"a\": 1");
    let mut session = UploadSession::new("db");
    let err = session.load_file(file.path(), None).unwrap_err();
    assert!(matches!(err, ImportError::ParseError(_)));
    assert!(session.spec().is_none());
}

#[test]
fn test_strict_columns_reports_line() {
    let format = ImportFormat::Csv(CsvOptions {
        strict_columns: true,
        ..Default::default()
    });
    let err = table_upload_sdk::import::parse("a,b\n1,2\n3\n", &format).unwrap_err();
    assert_eq!(
        err,
        ImportError::RaggedRow {
            line: 3,
            expected: 2,
            found: 1
        }
    );
}

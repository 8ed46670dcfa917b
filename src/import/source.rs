//! Source file loading and format detection

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use super::{CsvOptions, ImportError, ImportFormat, ImportResult, JsonOptions};
use crate::models::ParsedDataset;

/// A file selected for upload, held in memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path to the file (empty for in-memory content)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// SHA-256 of the content, lowercase hex
    pub content_hash: String,
    content: String,
}

impl SourceFile {
    /// Read a UTF-8 file from disk
    pub fn read(path: impl AsRef<Path>) -> ImportResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| ImportError::IoError(format!("{}: {}", path.display(), e)))?;
        let content = String::from_utf8(bytes).map_err(|e| {
            ImportError::ParseError(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;

        let mut file = Self::from_string(content);
        file.path = path.to_path_buf();
        info!(
            "Loaded {} ({} bytes, sha256 {})",
            path.display(),
            file.size,
            file.content_hash
        );
        Ok(file)
    }

    /// Wrap content that did not come from disk
    pub fn from_string(content: impl Into<String>) -> Self {
        let content = content.into();
        // A leading BOM would otherwise end up in the first header name
        let content = match content.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => content,
        };
        let hash = Sha256::digest(content.as_bytes());
        Self {
            path: PathBuf::new(),
            size: content.len() as u64,
            content_hash: format!("{:x}", hash),
            content,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// File name without directories, if the file came from disk
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Detect the format from the extension, falling back to the content
    ///
    /// - `csv` → CSV, `tsv`/`tab` → tab-delimited CSV
    /// - `json` → JSON, `jsonl`/`ndjson` → JSON Lines
    /// - anything else: `[` or `{` on the first non-blank line selects JSON
    ///   (JSON Lines when that first line is itself a complete object), else
    ///   CSV
    pub fn detect_format(&self) -> ImportFormat {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => ImportFormat::Csv(CsvOptions::default()),
            Some("tsv") | Some("tab") => ImportFormat::Csv(CsvOptions::tsv()),
            Some("json") => ImportFormat::Json(JsonOptions::default()),
            Some("jsonl") | Some("ndjson") => ImportFormat::JsonLines(JsonOptions::default()),
            _ => sniff_format(&self.content),
        }
    }

    /// Parse the content in the given format
    pub fn parse(&self, format: &ImportFormat) -> ImportResult<ParsedDataset> {
        super::parse(&self.content, format)
    }
}

fn sniff_format(content: &str) -> ImportFormat {
    let first_line = content.lines().map(str::trim).find(|l| !l.is_empty());
    match first_line {
        Some(line) if line.starts_with('{') => {
            let single_line_object = serde_json::from_str::<serde_json::Value>(line)
                .map(|v| v.is_object())
                .unwrap_or(false);
            let more_lines = content.trim().lines().count() > 1;
            if single_line_object && more_lines {
                ImportFormat::JsonLines(JsonOptions::default())
            } else {
                ImportFormat::Json(JsonOptions::default())
            }
        }
        Some(line) if line.starts_with('[') => ImportFormat::Json(JsonOptions::default()),
        Some(line) if line.contains('\t') && !line.contains(',') => {
            ImportFormat::Csv(CsvOptions::tsv())
        }
        _ => ImportFormat::Csv(CsvOptions::default()),
    }
}

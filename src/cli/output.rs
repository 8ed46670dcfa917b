//! Rendering of tabular command output

use serde_json::Value;

use crate::cli::error::CliError;
use crate::database::QueryResult;

/// How `preview` prints the schema and sample tables
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned columns for the terminal
    #[default]
    Table,
    /// Pretty-printed array of row objects
    Json,
    /// RFC 4180 CSV with a header record
    Csv,
}

/// Render a result set in the requested format
pub fn render(result: &QueryResult, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(result)),
        OutputFormat::Json => serde_json::to_string_pretty(&result.rows)
            .map_err(|e| CliError::IoError(format!("Failed to encode JSON output: {}", e))),
        OutputFormat::Csv => render_csv(result),
    }
}

fn cell<'a>(row: &'a Value, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

/// Strings unquoted, `null` as the given placeholder, anything else as JSON
fn cell_text(value: &Value, null: &str) -> String {
    match value {
        Value::Null => null.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_csv(result: &QueryResult) -> Result<String, CliError> {
    let csv_error = |e: csv::Error| CliError::IoError(format!("Failed to write CSV output: {}", e));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&result.columns).map_err(csv_error)?;
    for row in &result.rows {
        let record = result.columns.iter().map(|c| cell_text(cell(row, c), ""));
        writer.write_record(record).map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::IoError(format!("Failed to flush CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CliError::IoError(e.to_string()))
}

fn render_table(result: &QueryResult) -> String {
    let body: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| {
            result
                .columns
                .iter()
                .map(|c| cell_text(cell(row, c), "NULL"))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            body.iter()
                .map(|line| line[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = Vec::with_capacity(body.len() + 3);
    out.push(pad_line(result.columns.iter().map(String::as_str), &widths));
    out.push(pad_line(rule.iter().map(String::as_str), &widths));
    for row in &body {
        out.push(pad_line(row.iter().map(String::as_str), &widths));
    }
    let count = result.row_count();
    out.push(format!("({} {})", count, if count == 1 { "row" } else { "rows" }));
    out.join("\n")
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(text, width)| format!("{:<width$}", text, width = *width))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result() -> QueryResult {
        QueryResult::new(
            vec!["name".to_string(), "a,b".to_string()],
            vec![
                json!({"name": "x", "a,b": 1}),
                json!({"name": "quote \"q\"", "a,b": null}),
            ],
        )
    }

    #[test]
    fn test_csv_quotes_header_and_cells() {
        let out = render(&result(), OutputFormat::Csv).unwrap();
        assert_eq!(out, "name,\"a,b\"\nx,1\n\"quote \"\"q\"\"\",\n");

        let mut reader = csv::Reader::from_reader(out.as_bytes());
        assert_eq!(reader.headers().unwrap().len(), 2);
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn test_table_alignment() {
        let out = render(&result(), OutputFormat::Table).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "name       a,b");
        assert_eq!(lines[1], "---------  ----");
        assert_eq!(lines[2], "x          1");
        assert_eq!(lines[3], "quote \"q\"  NULL");
        assert_eq!(lines[4], "(2 rows)");

        let empty = QueryResult::new(vec!["id".to_string()], Vec::new());
        assert_eq!(render(&empty, OutputFormat::Table).unwrap(), "id\n--\n(0 rows)");
    }

    #[test]
    fn test_json_rows() {
        let out = render(&result(), OutputFormat::Json).unwrap();
        let back: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(back[0]["a,b"], 1);
    }
}

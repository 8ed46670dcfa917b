//! Column type inference
//!
//! Guesses a [`TypeTag`] per column from a sample of rows. Inference is pure
//! and never fails: anything that is not consistently numeric or temporal is
//! a `String` column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::{CellValue, Field, ParsedDataset, RawRow, TypeTag};

/// Default number of rows sampled for inference
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// A calendar value recognized in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Date(NaiveDate),
    /// Offsets are converted to UTC
    DateTime(NaiveDateTime),
}

impl Temporal {
    pub fn date(&self) -> NaiveDate {
        match self {
            Temporal::Date(date) => *date,
            Temporal::DateTime(date_time) => date_time.date(),
        }
    }

    /// Date-only values fall at midnight
    pub fn date_time(&self) -> NaiveDateTime {
        match self {
            Temporal::Date(date) => date.and_time(NaiveTime::default()),
            Temporal::DateTime(date_time) => *date_time,
        }
    }
}

/// Candidate types still possible for one column
#[derive(Debug, Clone, Copy)]
struct Candidates {
    integer: bool,
    number: bool,
    date: bool,
}

impl Candidates {
    fn all() -> Self {
        Self {
            integer: true,
            number: true,
            date: true,
        }
    }

    fn none_left(&self) -> bool {
        !self.integer && !self.number && !self.date
    }

    fn observe(&mut self, cell: &CellValue) {
        match cell {
            CellValue::Null => {}
            CellValue::Bool(_) => {
                self.integer = false;
                self.number = false;
                self.date = false;
            }
            CellValue::Number(n) => {
                self.date = false;
                match n.as_f64() {
                    Some(v) if v.is_finite() => {
                        if !n.is_i64() {
                            self.integer = false;
                        }
                    }
                    _ => {
                        self.integer = false;
                        self.number = false;
                    }
                }
            }
            CellValue::Text(text) => {
                if text.is_empty() {
                    return;
                }
                if parse_number(text).is_none() {
                    self.integer = false;
                    self.number = false;
                } else if parse_integer(text).is_none() {
                    self.integer = false;
                }
                if self.date && !is_date(text) {
                    self.date = false;
                }
            }
        }
    }

    fn resolve(&self) -> TypeTag {
        if self.integer {
            TypeTag::Int64
        } else if self.number {
            TypeTag::Float64
        } else if self.date {
            TypeTag::DateTime
        } else {
            TypeTag::String
        }
    }
}

/// Parse trimmed text as a finite floating-point number
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse trimmed text as a signed 64-bit integer
pub fn parse_integer(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// Parse text in any of the recognized date or date/time layouts
pub fn parse_temporal(text: &str) -> Option<Temporal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(Temporal::DateTime(parsed.naive_utc()));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(Temporal::DateTime(parsed.naive_utc()));
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(Temporal::DateTime)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                .map(Temporal::Date)
        })
}

/// Whether text parses as a calendar date or date-time
pub fn is_date(text: &str) -> bool {
    parse_temporal(text).is_some()
}

/// Infer one column's type from its non-empty sample values
pub fn infer_column<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> TypeTag {
    let mut candidates = Candidates::all();
    let mut seen = false;
    for value in values {
        if value.is_empty() {
            continue;
        }
        seen = true;
        candidates.observe(value);
        if candidates.none_left() {
            break;
        }
    }
    if seen {
        candidates.resolve()
    } else {
        TypeTag::String
    }
}

/// Infer a type for every header from the sample rows.
///
/// Priority is integer, then number, then date-time, then string, so a
/// column of whole numbers is never typed as a date.
///
/// # Example
///
/// ```rust
/// use table_upload_sdk::inference::infer;
/// use table_upload_sdk::models::{CellValue, TypeTag};
///
/// let headers = vec!["id".to_string(), "when".to_string()];
/// let rows = vec![vec![CellValue::from("1"), CellValue::from("2024-01-02")]];
/// assert_eq!(infer(&headers, &rows), vec![TypeTag::Int64, TypeTag::DateTime]);
/// ```
pub fn infer(headers: &[String], sample_rows: &[RawRow]) -> Vec<TypeTag> {
    (0..headers.len())
        .map(|column| infer_column(sample_rows.iter().filter_map(|row| row.get(column))))
        .collect()
}

/// Build the initial field list for a dataset: one nullable field per
/// header, typed from the first `sample_size` rows.
pub fn infer_fields(dataset: &ParsedDataset, sample_size: usize) -> Vec<Field> {
    let types = infer(dataset.headers(), dataset.sample(sample_size));
    dataset
        .headers()
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (name, type_tag))| Field::new(name.clone(), type_tag).with_source(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> TypeTag {
        let cells: Vec<CellValue> = values.iter().map(|v| CellValue::from(*v)).collect();
        infer_column(&cells)
    }

    #[test]
    fn test_integer_column() {
        assert_eq!(column(&["1", "2", " 30 "]), TypeTag::Int64);
        assert_eq!(column(&["-7", "+8"]), TypeTag::Int64);
    }

    #[test]
    fn test_integer_needs_i64_text() {
        assert_eq!(column(&["1", "2.0"]), TypeTag::Float64);
        assert_eq!(column(&["1", "1e3"]), TypeTag::Float64);
        assert_eq!(column(&["1", "99999999999999999999"]), TypeTag::Float64);
    }

    #[test]
    fn test_float_column() {
        assert_eq!(column(&["1", "2.5", "-3e2"]), TypeTag::Float64);
    }

    #[test]
    fn test_date_column() {
        assert_eq!(column(&["2024-01-01", "2024-02-03 10:11:12"]), TypeTag::DateTime);
        assert_eq!(column(&["2024-01-01T10:00:00Z"]), TypeTag::DateTime);
        assert_eq!(column(&["01/31/2024", "31.01.2024"]), TypeTag::DateTime);
    }

    #[test]
    fn test_integers_are_never_dates() {
        assert_eq!(column(&["20240101", "20240102"]), TypeTag::Int64);
    }

    #[test]
    fn test_mixed_falls_back_to_string() {
        assert_eq!(column(&["1", "abc"]), TypeTag::String);
        assert_eq!(column(&["2024-01-01", "7"]), TypeTag::String);
        assert_eq!(column(&["NaN"]), TypeTag::String);
        assert_eq!(column(&["inf"]), TypeTag::String);
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        assert_eq!(column(&["", "5", ""]), TypeTag::Int64);
        assert_eq!(column(&["", ""]), TypeTag::String);
        assert_eq!(infer_column(&[CellValue::Null]), TypeTag::String);
    }

    #[test]
    fn test_json_scalars() {
        let ints = [CellValue::Number(1.into()), CellValue::Number(2.into())];
        assert_eq!(infer_column(&ints), TypeTag::Int64);

        let floats = [
            CellValue::Number(1.into()),
            CellValue::Number(serde_json::Number::from_f64(1.5).unwrap()),
        ];
        assert_eq!(infer_column(&floats), TypeTag::Float64);

        assert_eq!(infer_column(&[CellValue::Bool(true)]), TypeTag::String);
    }

    #[test]
    fn test_json_numbers_beyond_i64() {
        let big = [CellValue::Number(u64::MAX.into()), CellValue::Number(1.into())];
        assert_eq!(infer_column(&big), TypeTag::Float64);

        let whole_float = [CellValue::Number(serde_json::Number::from_f64(2.0).unwrap())];
        assert_eq!(infer_column(&whole_float), TypeTag::Float64);
    }

    #[test]
    fn test_parse_temporal_normalizes() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(parse_temporal("01/31/2024"), Some(Temporal::Date(expected)));
        assert_eq!(parse_temporal(" 31.01.2024 "), Some(Temporal::Date(expected)));

        let utc = parse_temporal("2024-01-31T12:00:00+02:00").unwrap();
        assert_eq!(utc.date_time(), expected.and_hms_opt(10, 0, 0).unwrap());
        let rfc2822 = parse_temporal("Wed, 31 Jan 2024 10:00:00 +0000").unwrap();
        assert_eq!(rfc2822.date_time(), expected.and_hms_opt(10, 0, 0).unwrap());

        assert_eq!(
            Temporal::Date(expected).date_time(),
            expected.and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(parse_temporal("20240131"), None);
    }

    #[test]
    fn test_inference_only_reads_the_sample() {
        let dataset = ParsedDataset::new(
            vec!["n".to_string()],
            vec![vec!["1".into()], vec!["2".into()], vec!["x".into()]],
        );
        assert_eq!(infer_fields(&dataset, 2)[0].type_tag, TypeTag::Int64);
        assert_eq!(infer_fields(&dataset, 3)[0].type_tag, TypeTag::String);
    }

    #[test]
    fn test_infer_fields_shape() {
        let dataset = ParsedDataset::new(
            vec!["name".to_string(), "age".to_string()],
            vec![vec!["Alice".into(), "30".into()]],
        );
        let fields = infer_fields(&dataset, DEFAULT_SAMPLE_SIZE);
        assert_eq!(fields[1].name, "age");
        assert_eq!(fields[1].type_tag, TypeTag::Int64);
        assert_eq!(fields[1].source_column, Some(1));
        assert!(fields.iter().all(|f| f.nullable && !f.is_key()));
    }

    #[test]
    fn test_infer_is_deterministic() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            vec![CellValue::from("1.5"), CellValue::from("x")],
            vec![CellValue::from("2"), CellValue::from("2024-01-01")],
        ];
        assert_eq!(infer(&headers, &rows), infer(&headers, &rows));
        assert_eq!(infer(&headers, &rows), vec![TypeTag::Float64, TypeTag::String]);
    }
}

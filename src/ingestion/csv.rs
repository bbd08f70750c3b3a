//! CSV ingestion implementation.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataType, RecordTable, Schema, Value};

/// Ingest a CSV file into an in-memory [`RecordTable`].
///
/// Rules:
///
/// - CSV must have headers.
/// - Headers must contain all schema fields (order can differ, extra columns are ignored).
/// - Each value is parsed according to the schema field type.
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
) -> IngestionResult<RecordTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Ingest CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<RecordTable> {
    let headers = rdr.headers()?.clone();

    // Map schema fields -> CSV column indexes (allows re-ordered CSV columns).
    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, &field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(RecordTable::new(schema.clone(), rows))
}

pub(crate) fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_err = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_err(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_err),
        DataType::Date => parse_date(trimmed).map(Value::Date).map_err(parse_err),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

/// Parse a stored date, truncating any time-of-day suffix.
///
/// Accepts `YYYY-MM-DD`, anything that starts with `YYYY-MM-DD` (`2020-04-12 23:18:15`,
/// `2020-04-12T23:18:15Z`), and `M/D/YYYY`.
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    if let Some(day) = s.get(..10) {
        if let Ok(d) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Ok(d);
        }
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y")
        .map_err(|_| "expected date (YYYY-MM-DD[...] or M/D/YYYY)".to_string())
}

#[cfg(test)]
mod tests {
    use super::parse_date;
    use chrono::NaiveDate;

    #[test]
    fn timestamps_are_truncated_to_the_day() {
        let d = NaiveDate::from_ymd_opt(2020, 4, 12).unwrap();
        assert_eq!(parse_date("2020-04-12").unwrap(), d);
        assert_eq!(parse_date("2020-04-12 23:18:15").unwrap(), d);
        assert_eq!(parse_date("2020-04-12T23:18:15Z").unwrap(), d);
        assert_eq!(parse_date("4/12/2020").unwrap(), d);
    }

    #[test]
    fn rejects_non_dates() {
        assert!(parse_date("12 April").is_err());
        assert!(parse_date("2020-13-01").is_err());
    }
}

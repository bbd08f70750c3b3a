//! Query result types.
//!
//! Everything here is freshly built per query and owned by the caller. The `*Payload` and
//! [`RecordsFrame`] shapes are what a serving layer forwards to a client unchanged.

use chrono::NaiveDate;
use serde::Serialize;
use serde::ser::{SerializeMap, SerializeStruct, Serializer};

use crate::types::{DataType, Field, RecordTable, Schema, Value};

/// One reduced observation: the maximum reported value for a day (and region).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// `None` when the series was reduced by date only.
    pub region: Option<String>,
    pub value: f64,
}

/// Output of the daily reducer, ordered by date (then region name).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredSeries {
    pub points: Vec<SeriesPoint>,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct dates in ascending order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut out: Vec<NaiveDate> = Vec::new();
        for p in &self.points {
            if out.last() != Some(&p.date) {
                out.push(p.date);
            }
        }
        out
    }

    /// Turn the series back into a table with `region`, `date` and `metric` columns.
    ///
    /// Region cells are `Null` for date-only series.
    pub fn to_table(&self, region: &str, date: &str, metric: &str) -> RecordTable {
        let schema = Schema::new(vec![
            Field::new(region, DataType::Utf8),
            Field::new(date, DataType::Date),
            Field::new(metric, DataType::Float64),
        ]);
        let rows = self
            .points
            .iter()
            .map(|p| {
                vec![
                    p.region.clone().map(Value::Utf8).unwrap_or(Value::Null),
                    Value::Date(p.date),
                    Value::Float64(p.value),
                ]
            })
            .collect();
        RecordTable::new(schema, rows)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaPoint {
    pub date: NaiveDate,
    pub delta: f64,
}

/// Day-over-day differences. The first date of the source series has no entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeltaSeries {
    pub points: Vec<DeltaPoint>,
}

impl DeltaSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.delta).collect()
    }

    pub fn to_payload(&self) -> SeriesPayload {
        SeriesPayload {
            values: self.values(),
            dates: self
                .points
                .iter()
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .collect(),
        }
    }
}

/// `{ "values": [...], "dates": [...] }`, the chart-ready form of a [`DeltaSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPayload {
    pub values: Vec<f64>,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub value: f64,
    pub region: String,
    /// Position of the region in discovery order (first appearance in the table).
    pub index: usize,
}

/// Regions sorted by value, highest first, ties in discovery order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Ranking {
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    pub fn regions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.region.as_str()).collect()
    }
}

/// A bucket value: a raw count or a share of the group's total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Share {
    Count(i64),
    Fraction(f64),
}

impl Share {
    pub fn as_f64(&self) -> f64 {
        match self {
            Share::Count(v) => *v as f64,
            Share::Fraction(v) => *v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisValue {
    pub axis: String,
    pub value: Share,
}

/// Per-sex breakdown over the bucket axis, in source label order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionResult {
    pub male: Vec<AxisValue>,
    pub female: Vec<AxisValue>,
}

/// Column list plus rows, serialized as `{ "cols": [...], "rows": [{col: value}, ...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordsFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RecordsFrame {
    /// Frame over every column of `table`. With `fill_nulls`, missing cells become `0`.
    pub fn from_table(table: &RecordTable, fill_nulls: bool) -> Self {
        let rows = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| match v {
                        Value::Null if fill_nulls => Value::Int64(0),
                        other => other.clone(),
                    })
                    .collect()
            })
            .collect();
        Self {
            columns: table.schema.field_names().map(str::to_owned).collect(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Render as CSV text with a header row. `Null` cells are written empty.
    pub fn to_csv_string(&self) -> csv::Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(csv_cell))?;
        }
        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn csv_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Int64(x) => x.to_string(),
        Value::Float64(x) => x.to_string(),
        Value::Bool(x) => x.to_string(),
        Value::Utf8(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

struct RowObject<'a> {
    columns: &'a [String],
    row: &'a [Value],
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (col, v) in self.columns.iter().zip(self.row) {
            map.serialize_entry(col, v)?;
        }
        map.end()
    }
}

impl Serialize for RecordsFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<RowObject<'_>> = self
            .rows
            .iter()
            .map(|row| RowObject {
                columns: &self.columns,
                row,
            })
            .collect();
        let mut s = serializer.serialize_struct("RecordsFrame", 2)?;
        s.serialize_field("cols", &self.columns)?;
        s.serialize_field("rows", &rows)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{DeltaPoint, DeltaSeries, RecordsFrame, Share};
    use crate::types::{DataType, Field, RecordTable, Schema, Value};
    use chrono::NaiveDate;

    fn beds() -> RecordTable {
        let schema = Schema::new(vec![
            Field::new("State", DataType::Utf8),
            Field::new("Beds", DataType::Int64),
        ]);
        RecordTable::new(
            schema,
            vec![
                vec![Value::Utf8("Kerala".into()), Value::Int64(120)],
                vec![Value::Utf8("Goa".into()), Value::Null],
            ],
        )
    }

    #[test]
    fn frame_serializes_as_cols_and_row_objects() {
        let frame = RecordsFrame::from_table(&beds(), true);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cols": ["State", "Beds"],
                "rows": [
                    {"State": "Kerala", "Beds": 120},
                    {"State": "Goa", "Beds": 0}
                ]
            })
        );
    }

    #[test]
    fn frame_renders_csv_with_empty_nulls() {
        let frame = RecordsFrame::from_table(&beds(), false);
        assert_eq!(frame.to_csv_string().unwrap(), "State,Beds\nKerala,120\nGoa,\n");
    }

    #[test]
    fn csv_rendering_quotes_cells_and_reports_csv_errors() {
        let frame = RecordsFrame {
            columns: vec!["State".into(), "Note".into()],
            rows: vec![vec![Value::Utf8("Goa".into()), Value::Utf8("beds, \"rural\"".into())]],
        };
        let csv: csv::Result<String> = frame.to_csv_string();
        assert_eq!(csv.unwrap(), "State,Note\nGoa,\"beds, \"\"rural\"\"\"\n");
    }

    #[test]
    fn delta_payload_formats_dates() {
        let series = DeltaSeries {
            points: vec![DeltaPoint {
                date: NaiveDate::from_ymd_opt(2020, 4, 2).unwrap(),
                delta: 5.0,
            }],
        };
        let payload = series.to_payload();
        assert_eq!(payload.values, vec![5.0]);
        assert_eq!(payload.dates, vec!["2020-04-02".to_string()]);
    }

    #[test]
    fn shares_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&vec![Share::Count(3), Share::Fraction(0.25)]).unwrap();
        assert_eq!(json, "[3,0.25]");
    }
}

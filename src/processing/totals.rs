//! Per-region sums over a date window (choropleth map data).

use crate::config::SeriesColumns;
use crate::error::QueryResult;
use crate::series::RecordsFrame;
use crate::types::{DataType, RecordTable, Value};
use crate::window::DateWindow;

use super::filter::filter_date_window;
use super::reduce::{reduce, ReduceOp};
use super::{column_index, metric_index};

/// Sum each of `metrics` over every raw row of each region inside `window`.
///
/// These are plain sums of the rows as reported, with no same-day reduction. The first column
/// is named `region_label`; regions are in ascending name order. Null and `NaN` cells add
/// nothing, and a region with no present value totals 0.
pub fn region_totals(
    table: &RecordTable,
    columns: &SeriesColumns,
    metrics: &[&str],
    window: DateWindow,
    region_label: &str,
) -> QueryResult<RecordsFrame> {
    column_index(table, &columns.region, DataType::Utf8)?;
    for m in metrics {
        metric_index(table, m)?;
    }

    let windowed = filter_date_window(table, &columns.date, window)?;
    let groups = windowed
        .group_by(&[columns.region.as_str()])
        .unwrap_or_default();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(groups.len());
    for group in groups {
        let Some(region) = group.key[0].as_str() else {
            continue;
        };
        let mut row = vec![Value::Utf8(region.to_string())];
        row.extend(metrics.iter().map(|m| {
            let total = reduce(&group.table, m, ReduceOp::Sum).and_then(|v| v.as_f64());
            Value::Float64(total.unwrap_or(0.0))
        }));
        rows.push(row);
    }
    rows.sort_by(|a, b| a[0].as_str().cmp(&b[0].as_str()));

    let mut frame_columns = vec![region_label.to_string()];
    frame_columns.extend(metrics.iter().map(|m| m.to_string()));
    Ok(RecordsFrame {
        columns: frame_columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::region_totals;
    use crate::config::SeriesColumns;
    use crate::types::{DataType, Field, RecordTable, Schema, Value};
    use crate::window::DateWindow;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    fn table() -> RecordTable {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("date", DataType::Date),
            Field::new("Confirmed", DataType::Int64),
            Field::new("Deaths", DataType::Int64),
        ]);
        let row = |r: &str, d: u32, c: i64, x: Option<i64>| {
            vec![
                Value::Utf8(r.to_string()),
                Value::Date(day(d)),
                Value::Int64(c),
                x.map(Value::Int64).unwrap_or(Value::Null),
            ]
        };
        RecordTable::new(
            schema,
            vec![
                row("Utah", 1, 4, Some(1)),
                row("Ohio", 1, 10, None),
                row("Ohio", 1, 12, Some(2)),
                row("Ohio", 5, 50, Some(5)),
            ],
        )
    }

    #[test]
    fn sums_raw_rows_per_region_in_name_order() {
        let f = region_totals(
            &table(),
            &SeriesColumns::default(),
            &["Confirmed", "Deaths"],
            DateWindow::new(day(1), day(4)),
            "states",
        )
        .unwrap();
        assert_eq!(f.columns, vec!["states", "Confirmed", "Deaths"]);
        assert_eq!(
            f.rows,
            vec![
                vec![Value::Utf8("Ohio".into()), Value::Float64(22.0), Value::Float64(2.0)],
                vec![Value::Utf8("Utah".into()), Value::Float64(4.0), Value::Float64(1.0)],
            ]
        );
        assert_eq!(
            f.to_csv_string().unwrap(),
            "states,Confirmed,Deaths\nOhio,22,2\nUtah,4,1\n"
        );
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = region_totals(
            &table(),
            &SeriesColumns::default(),
            &["Recovered"],
            DateWindow::new(day(1), day(4)),
            "states",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown column 'Recovered'");
    }

    #[test]
    fn nan_cells_and_short_rows_add_nothing() {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("date", DataType::Date),
            Field::new("Confirmed", DataType::Float64),
        ]);
        let t = RecordTable::new(
            schema,
            vec![
                vec![Value::Utf8("Iowa".into()), Value::Date(day(1)), Value::Float64(f64::NAN)],
                vec![Value::Utf8("Iowa".into()), Value::Date(day(2)), Value::Float64(3.0)],
                vec![Value::Utf8("Kansas".into()), Value::Date(day(2))],
            ],
        );
        let f = region_totals(
            &t,
            &SeriesColumns::default(),
            &["Confirmed"],
            DateWindow::new(day(1), day(4)),
            "states",
        )
        .unwrap();
        assert_eq!(
            f.rows,
            vec![
                vec![Value::Utf8("Iowa".into()), Value::Float64(3.0)],
                vec![Value::Utf8("Kansas".into()), Value::Float64(0.0)],
            ]
        );
    }
}

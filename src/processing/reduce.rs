//! Reduction operations for [`crate::types::RecordTable`], including the per-day max reducer.

use crate::config::SeriesColumns;
use crate::error::QueryResult;
use crate::series::{FilteredSeries, SeriesPoint};
use crate::types::{DataType, RecordTable, Value};

use super::{column_index, metric_index};

/// Built-in reduction operations over a single numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Maximum numeric value, ignoring nulls.
    Max,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - Returns `Some(Value::Null)` if there are no present values. Float `NaN` cells count as
///   missing, so the result never depends on row order.
/// - Non-numeric columns reduce to `Some(Value::Null)`.
pub fn reduce(table: &RecordTable, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = table.schema.index_of(column)?;

    match table.schema.fields[idx].data_type {
        DataType::Int64 => {
            let acc = fold_present(table, idx, op, |v| match v {
                Value::Int64(x) => Some(*x),
                _ => None,
            });
            Some(acc.map(Value::Int64).unwrap_or(Value::Null))
        }
        DataType::Float64 => {
            let acc = fold_present(table, idx, op, |v| match v {
                Value::Float64(x) if !x.is_nan() => Some(*x),
                _ => None,
            });
            Some(acc.map(Value::Float64).unwrap_or(Value::Null))
        }
        _ => Some(Value::Null),
    }
}

fn fold_present<T, F>(table: &RecordTable, idx: usize, op: ReduceOp, extract: F) -> Option<T>
where
    T: Copy + PartialOrd + std::ops::Add<Output = T>,
    F: Fn(&Value) -> Option<T>,
{
    table
        .rows
        .iter()
        .filter_map(|row| row.get(idx).and_then(&extract))
        .fold(None, |acc, v| {
            Some(match (op, acc) {
                (_, None) => v,
                (ReduceOp::Sum, Some(a)) => a + v,
                (ReduceOp::Max, Some(a)) => {
                    if v > a {
                        v
                    } else {
                        a
                    }
                }
            })
        })
}

/// Grouping keys for [`reduce_daily`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKeys {
    /// One value per date, taken across every row of that date.
    Date,
    /// One value per (date, region) pair.
    DateRegion,
}

/// Collapse same-day rows into a single value per group by taking the maximum.
///
/// Cumulative counters only grow, so duplicated or re-issued reports are resolved by keeping
/// the largest one. Null metric cells do not take part; a group whose cells are all null is
/// dropped. Rows with a null date (or null region, when grouping by region) are skipped.
///
/// The output is ordered by date, then by region name.
pub fn reduce_daily(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    keys: GroupKeys,
) -> QueryResult<FilteredSeries> {
    column_index(table, &columns.date, DataType::Date)?;
    metric_index(table, metric)?;

    let key_columns: Vec<&str> = match keys {
        GroupKeys::Date => vec![columns.date.as_str()],
        GroupKeys::DateRegion => {
            column_index(table, &columns.region, DataType::Utf8)?;
            vec![columns.date.as_str(), columns.region.as_str()]
        }
    };

    let groups = table.group_by(&key_columns).unwrap_or_default();

    let mut points: Vec<SeriesPoint> = Vec::with_capacity(groups.len());
    for group in groups {
        let Some(date) = group.key[0].as_date() else {
            continue;
        };
        let region = match group.key.get(1) {
            Some(Value::Utf8(r)) => Some(r.clone()),
            Some(_) => continue,
            None => None,
        };
        let Some(value) = reduce(&group.table, metric, ReduceOp::Max).and_then(|v| v.as_f64())
        else {
            continue;
        };
        points.push(SeriesPoint {
            date,
            region,
            value,
        });
    }

    points.sort_by(|a, b| (a.date, &a.region).cmp(&(b.date, &b.region)));
    Ok(FilteredSeries { points })
}

#[cfg(test)]
mod tests {
    use super::{reduce, reduce_daily, GroupKeys, ReduceOp};
    use crate::config::SeriesColumns;
    use crate::types::{DataType, Field, RecordTable, Schema, Value};
    use chrono::NaiveDate;

    fn numeric_table_with_nulls() -> RecordTable {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Float64(10.0)],
            vec![Value::Int64(2), Value::Null],
            vec![Value::Int64(3), Value::Float64(5.5)],
        ];

        RecordTable::new(schema, rows)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap()
    }

    fn reports(rows: &[(&str, u32, Option<f64>)]) -> RecordTable {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("date", DataType::Date),
            Field::new("Confirmed", DataType::Float64),
        ]);
        RecordTable::new(
            schema,
            rows.iter()
                .map(|(r, d, v)| {
                    vec![
                        Value::Utf8(r.to_string()),
                        Value::Date(day(*d)),
                        v.map(Value::Float64).unwrap_or(Value::Null),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn reduce_sum_ignores_nulls_and_preserves_type() {
        let t = numeric_table_with_nulls();
        assert_eq!(reduce(&t, "score", ReduceOp::Sum), Some(Value::Float64(15.5)));
        assert_eq!(reduce(&t, "id", ReduceOp::Sum), Some(Value::Int64(6)));
    }

    #[test]
    fn reduce_max_ignores_nulls() {
        let t = numeric_table_with_nulls();
        assert_eq!(reduce(&t, "score", ReduceOp::Max), Some(Value::Float64(10.0)));
        assert_eq!(reduce(&t, "id", ReduceOp::Max), Some(Value::Int64(3)));
    }

    #[test]
    fn reduce_returns_none_for_missing_column() {
        let t = numeric_table_with_nulls();
        assert_eq!(reduce(&t, "missing", ReduceOp::Sum), None);
    }

    #[test]
    fn reduce_numeric_returns_null_if_all_values_null() {
        let schema = Schema::new(vec![Field::new("score", DataType::Float64)]);
        let t = RecordTable::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        assert_eq!(reduce(&t, "score", ReduceOp::Max), Some(Value::Null));
    }

    #[test]
    fn duplicate_reports_keep_the_maximum() {
        let t = reports(&[("Ohio", 1, Some(100.0)), ("Ohio", 1, Some(80.0))]);
        let s = reduce_daily(&t, &SeriesColumns::default(), "Confirmed", GroupKeys::DateRegion)
            .unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.points[0].value, 100.0);
        assert_eq!(s.points[0].region.as_deref(), Some("Ohio"));
    }

    #[test]
    fn null_cells_are_ignored_and_all_null_groups_dropped() {
        let t = reports(&[
            ("Ohio", 1, None),
            ("Ohio", 1, Some(4.0)),
            ("Ohio", 2, None),
            ("Iowa", 2, Some(1.0)),
        ]);
        let s = reduce_daily(&t, &SeriesColumns::default(), "Confirmed", GroupKeys::DateRegion)
            .unwrap();
        let got: Vec<_> = s
            .points
            .iter()
            .map(|p| (p.date, p.region.clone().unwrap(), p.value))
            .collect();
        assert_eq!(
            got,
            vec![(day(1), "Ohio".to_string(), 4.0), (day(2), "Iowa".to_string(), 1.0)]
        );
    }

    #[test]
    fn output_is_ordered_by_date_then_region() {
        let t = reports(&[
            ("Utah", 3, Some(1.0)),
            ("Iowa", 1, Some(2.0)),
            ("Ohio", 3, Some(3.0)),
            ("Ohio", 1, Some(4.0)),
        ]);
        let s = reduce_daily(&t, &SeriesColumns::default(), "Confirmed", GroupKeys::DateRegion)
            .unwrap();
        let got: Vec<_> = s.points.iter().map(|p| (p.date, p.region.clone().unwrap())).collect();
        assert_eq!(
            got,
            vec![
                (day(1), "Iowa".to_string()),
                (day(1), "Ohio".to_string()),
                (day(3), "Ohio".to_string()),
                (day(3), "Utah".to_string()),
            ]
        );
    }

    #[test]
    fn date_only_grouping_takes_max_across_regions() {
        let t = reports(&[("Ohio", 1, Some(5.0)), ("Iowa", 1, Some(9.0)), ("Ohio", 2, Some(6.0))]);
        let s = reduce_daily(&t, &SeriesColumns::default(), "Confirmed", GroupKeys::Date).unwrap();
        assert_eq!(s.dates(), vec![day(1), day(2)]);
        assert_eq!(s.points.iter().map(|p| p.value).collect::<Vec<_>>(), vec![9.0, 6.0]);
        assert!(s.points.iter().all(|p| p.region.is_none()));
    }

    #[test]
    fn reduction_is_idempotent() {
        let cols = SeriesColumns::default();
        let t = reports(&[
            ("Ohio", 1, Some(10.0)),
            ("Ohio", 1, Some(12.0)),
            ("Iowa", 1, Some(3.0)),
            ("Ohio", 2, Some(15.0)),
            ("Iowa", 2, None),
        ]);
        let once = reduce_daily(&t, &cols, "Confirmed", GroupKeys::DateRegion).unwrap();
        let again = reduce_daily(
            &once.to_table(&cols.region, &cols.date, "Confirmed"),
            &cols,
            "Confirmed",
            GroupKeys::DateRegion,
        )
        .unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn non_numeric_metric_is_rejected() {
        let t = reports(&[("Ohio", 1, Some(1.0))]);
        assert!(reduce_daily(&t, &SeriesColumns::default(), "name", GroupKeys::Date).is_err());
    }

    #[test]
    fn nan_cells_do_not_depend_on_row_order() {
        let cols = SeriesColumns::default();
        for values in [[f64::NAN, 5.0], [5.0, f64::NAN]] {
            let t = reports(&[("Ohio", 1, Some(values[0])), ("Ohio", 1, Some(values[1]))]);
            let s = reduce_daily(&t, &cols, "Confirmed", GroupKeys::DateRegion).unwrap();
            assert_eq!(s.points[0].value, 5.0);
        }

        let only_nan = reports(&[("Ohio", 1, Some(f64::NAN)), ("Ohio", 2, Some(2.0))]);
        let s = reduce_daily(&only_nan, &cols, "Confirmed", GroupKeys::Date).unwrap();
        assert_eq!(s.dates(), vec![day(2)]);
    }
}

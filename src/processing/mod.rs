//! In-memory time-series transformations.
//!
//! The processing layer operates on [`crate::types::RecordTable`] values produced by ingestion.
//! Each step is a pure function returning a new value, so intermediate results can be inspected
//! and tested on their own:
//!
//! - [`filter_date_window`], [`filter_region`]: row selection
//! - [`reduce()`]: whole-column sum or max
//! - [`reduce_daily`]: one maximum per (date) or (date, region)
//! - [`delta()`], [`delta_series`] and [`range_aggregate`]: day-over-day and two-date changes
//! - [`rank()`] and [`top_trajectories`]: top-N regions at a day offset
//! - [`proportions`]: per-sex bucket breakdown
//! - [`region_totals`]: per-region window sums
//!
//! ## Example: window → daily max → deltas
//!
//! ```rust
//! use chrono::NaiveDate;
//! use outbreak_metrics::config::SeriesColumns;
//! use outbreak_metrics::processing::{delta, filter_date_window, reduce_daily, GroupKeys};
//! use outbreak_metrics::types::{DataType, Field, RecordTable, Schema, Value};
//! use outbreak_metrics::window::DateWindow;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2020, 4, d).unwrap();
//! let schema = Schema::new(vec![
//!     Field::new("name", DataType::Utf8),
//!     Field::new("date", DataType::Date),
//!     Field::new("Confirmed", DataType::Int64),
//! ]);
//! let table = RecordTable::new(
//!     schema,
//!     vec![
//!         vec![Value::Utf8("Ohio".into()), Value::Date(day(1)), Value::Int64(10)],
//!         vec![Value::Utf8("Ohio".into()), Value::Date(day(2)), Value::Int64(14)],
//!         // A corrected re-report for day 2; the larger value wins.
//!         vec![Value::Utf8("Ohio".into()), Value::Date(day(2)), Value::Int64(15)],
//!         vec![Value::Utf8("Ohio".into()), Value::Date(day(3)), Value::Int64(22)],
//!     ],
//! );
//!
//! let cols = SeriesColumns::default();
//! let windowed = filter_date_window(&table, &cols.date, DateWindow::new(day(1), day(3))).unwrap();
//! let series = reduce_daily(&windowed, &cols, "Confirmed", GroupKeys::Date).unwrap();
//! assert_eq!(delta(&series, false).values(), vec![5.0, 7.0]);
//! ```

pub mod delta;
pub mod filter;
pub mod proportion;
pub mod rank;
pub mod reduce;
pub mod totals;

pub use delta::{delta, delta_series, range_aggregate};
pub use filter::{filter_date_window, filter_region, RegionFilter};
pub use proportion::proportions;
pub use rank::{rank, region_panel, top_trajectories, RegionPanel, RegionSeries};
pub use reduce::{reduce, reduce_daily, GroupKeys, ReduceOp};
pub use totals::region_totals;

use crate::error::{QueryError, QueryResult};
use crate::types::{DataType, RecordTable};

/// Resolve a column that must exist with exactly `expected` type.
pub(crate) fn column_index(
    table: &RecordTable,
    name: &str,
    expected: DataType,
) -> QueryResult<usize> {
    let idx = table
        .schema
        .index_of(name)
        .ok_or_else(|| QueryError::UnknownColumn {
            column: name.to_string(),
        })?;
    if table.schema.fields[idx].data_type != expected {
        return Err(QueryError::TypeMismatch {
            column: name.to_string(),
            expected: type_name(&expected),
        });
    }
    Ok(idx)
}

/// Resolve a metric column (`Int64` or `Float64`).
pub(crate) fn metric_index(table: &RecordTable, name: &str) -> QueryResult<usize> {
    let idx = table
        .schema
        .index_of(name)
        .ok_or_else(|| QueryError::UnknownColumn {
            column: name.to_string(),
        })?;
    match table.schema.fields[idx].data_type {
        DataType::Int64 | DataType::Float64 => Ok(idx),
        _ => Err(QueryError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric",
        }),
    }
}

fn type_name(t: &DataType) -> &'static str {
    match t {
        DataType::Int64 => "Int64",
        DataType::Float64 => "Float64",
        DataType::Bool => "Bool",
        DataType::Utf8 => "Utf8",
        DataType::Date => "Date",
    }
}

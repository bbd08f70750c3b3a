//! `outbreak-metrics` turns raw epidemiological report tables into chart-ready series.
//!
//! Data is ingested once into an immutable in-memory [`types::RecordTable`] using a
//! user-provided [`types::Schema`], then queried many times. Each query is a short, pure pipeline:
//!
//! 1. **filter** rows by region and by an inclusive [`window::DateWindow`]
//! 2. **reduce** duplicate same-day reports to one maximum per day (and region)
//! 3. **derive** day-over-day deltas, two-date changes, top-N rankings or per-sex proportions
//!
//! ## Ingestion
//!
//! **File formats (auto-detected by extension):**
//!
//! - **CSV**: `.csv`
//! - **JSON**: `.json` (array-of-objects) and `.ndjson` (newline-delimited objects)
//!
//! Supported logical types are [`types::DataType::Int64`], [`types::DataType::Float64`],
//! [`types::DataType::Bool`], [`types::DataType::Utf8`] and [`types::DataType::Date`]. Date
//! columns accept `YYYY-MM-DD` (a trailing time part such as `T00:00:00` is ignored) and
//! `month/day/year`. Empty cells, explicit JSON `null` and absent JSON fields map to
//! [`types::Value::Null`].
//!
//! ```no_run
//! use outbreak_metrics::ingestion::{ingest_from_path, IngestionOptions};
//! use outbreak_metrics::types::{DataType, Field, Schema};
//!
//! # fn main() -> Result<(), outbreak_metrics::IngestionError> {
//! let schema = Schema::new(vec![
//!     Field::new("name", DataType::Utf8),
//!     Field::new("date", DataType::Date),
//!     Field::new("Confirmed", DataType::Int64),
//!     Field::new("Deaths", DataType::Int64),
//! ]);
//! let options = IngestionOptions::default();
//! let table = ingest_from_path("covid19_usa_complete.csv", &schema, &options)?;
//! println!("rows={}", table.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Queries
//!
//! [`query::QueryEngine`] owns the source tables behind `Arc`, parses request parameters
//! (`""`/`"all"` regions, `month/day/year` dates), applies defaults from [`config::QueryConfig`]
//! and reports each run to an optional [`query::QueryObserver`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use outbreak_metrics::config::QueryConfig;
//! use outbreak_metrics::query::QueryEngine;
//! use outbreak_metrics::types::{DataType, Field, RecordTable, Schema, Value};
//!
//! let day = |d| Value::Date(NaiveDate::from_ymd_opt(2020, 4, d).unwrap());
//! let series = RecordTable::new(
//!     Schema::new(vec![
//!         Field::new("name", DataType::Utf8),
//!         Field::new("date", DataType::Date),
//!         Field::new("Deaths", DataType::Int64),
//!     ]),
//!     vec![
//!         vec![Value::Utf8("Ohio".into()), day(1), Value::Int64(10)],
//!         vec![Value::Utf8("Ohio".into()), day(2), Value::Int64(15)],
//!         vec![Value::Utf8("Ohio".into()), day(3), Value::Int64(22)],
//!     ],
//! );
//! let categorical = RecordTable::empty(Schema::new(vec![]));
//! let engine = QueryEngine::new(Arc::new(series), Arc::new(categorical), QueryConfig::default());
//!
//! let payload = engine
//!     .delta_series("Ohio", "Deaths", Some("4/1/2020"), Some("4/3/2020"))
//!     .unwrap();
//! assert_eq!(payload.values, vec![5.0, 7.0]);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified ingestion entrypoints, CSV/JSON readers and ingestion observers
//! - [`types`]: schema, values and the in-memory record table
//! - [`window`]: inclusive date windows and request-date parsing
//! - [`processing`]: filter, reduce, delta, rank, proportion and totals steps
//! - [`series`]: derived result types and their serialized payload shapes
//! - [`query`]: the request-level engine and query observers
//! - [`config`]: column names, labels and default windows
//! - [`error`]: ingestion and query error types

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod query;
pub mod series;
pub mod types;
pub mod window;

pub use error::{IngestionError, IngestionResult, QueryError, QueryResult};

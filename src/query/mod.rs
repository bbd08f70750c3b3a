//! Request-level query entry points.
//!
//! This module sits "above" [`crate::processing`]: it parses raw request parameters (region
//! strings, `month/day/year` dates), fills in configured defaults, runs one pipeline, and reports
//! the run to an optional [`QueryObserver`]. Every query runs inside a `tracing` span named
//! `query`.
//!
//! Source tables are held behind [`Arc`] and never mutated, so one engine can be cloned into any
//! number of concurrent request handlers.

mod observer;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::QueryConfig;
use crate::error::QueryResult;
use crate::processing::{self, RegionFilter};
use crate::series::{ProportionResult, Ranking, RecordsFrame, SeriesPayload};
use crate::types::RecordTable;
use crate::window::{parse_request_date, DateWindow};

pub use observer::{LogQueryObserver, QueryEvent, QueryKind, QueryObserver};

/// Query engine over an immutable time-series table and an immutable categorical table.
#[derive(Clone)]
pub struct QueryEngine {
    series: Arc<RecordTable>,
    categorical: Arc<RecordTable>,
    config: QueryConfig,
    observer: Option<Arc<dyn QueryObserver>>,
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("series_rows", &self.series.row_count())
            .field("categorical_rows", &self.categorical.row_count())
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl QueryEngine {
    pub fn new(
        series: Arc<RecordTable>,
        categorical: Arc<RecordTable>,
        config: QueryConfig,
    ) -> Self {
        Self {
            series,
            categorical,
            config,
            observer: None,
        }
    }

    /// Attach an observer for query events.
    pub fn with_observer(mut self, observer: Arc<dyn QueryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Day-over-day deltas of `metric` for `region` (`""`/`"all"` for every region).
    ///
    /// Absent or blank dates fall back to the configured delta window. An unknown region yields an
    /// empty payload.
    pub fn delta_series(
        &self,
        region: &str,
        metric: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> QueryResult<SeriesPayload> {
        self.observe(
            QueryKind::DeltaSeries,
            self.series.row_count(),
            || {
                let window = DateWindow::from_request(start, end, self.config.delta_window)?;
                let filter = RegionFilter::parse(region);
                let deltas = processing::delta_series(
                    &self.series,
                    &self.config.series,
                    metric,
                    &filter,
                    window,
                )?;
                Ok(deltas.to_payload())
            },
            |p| p.values.len(),
        )
    }

    /// Change of `metric` for `region` between two required request dates.
    pub fn range_aggregate(
        &self,
        region: &str,
        metric: &str,
        start: &str,
        end: &str,
    ) -> QueryResult<Option<f64>> {
        self.observe(
            QueryKind::RangeAggregate,
            self.series.row_count(),
            || {
                let start = parse_request_date(start)?;
                let end = parse_request_date(end)?;
                processing::range_aggregate(
                    &self.series,
                    &self.config.series,
                    metric,
                    &RegionFilter::parse(region),
                    start,
                    end,
                )
            },
            |v| usize::from(v.is_some()),
        )
    }

    /// Top regions by `metric` at a day offset into the window.
    ///
    /// `None` for any of window bound, `offset` or `n` takes the configured ranking default.
    pub fn ranking(
        &self,
        metric: &str,
        start: Option<&str>,
        end: Option<&str>,
        offset: Option<usize>,
        n: Option<usize>,
    ) -> QueryResult<Ranking> {
        self.observe(
            QueryKind::Ranking,
            self.series.row_count(),
            || {
                let (window, offset, n) = self.ranking_params(start, end, offset, n)?;
                processing::rank(&self.series, &self.config.series, metric, window, offset, n)
            },
            |r| r.entries.len(),
        )
    }

    /// Window series of the top regions, one row per day with `total` and `day` columns.
    pub fn top_trajectories(
        &self,
        metric: &str,
        start: Option<&str>,
        end: Option<&str>,
        offset: Option<usize>,
        n: Option<usize>,
    ) -> QueryResult<RecordsFrame> {
        self.observe(
            QueryKind::TopTrajectories,
            self.series.row_count(),
            || {
                let (window, offset, n) = self.ranking_params(start, end, offset, n)?;
                processing::top_trajectories(
                    &self.series,
                    &self.config.series,
                    metric,
                    window,
                    offset,
                    n,
                )
            },
            RecordsFrame::row_count,
        )
    }

    /// Per-sex bucket breakdown from the categorical table.
    pub fn proportions(&self, region: &str, normalize: bool) -> QueryResult<ProportionResult> {
        self.observe(
            QueryKind::Proportions,
            self.categorical.row_count(),
            || {
                processing::proportions(
                    &self.categorical,
                    &self.config.categorical,
                    region,
                    normalize,
                )
            },
            |p| p.male.len() + p.female.len(),
        )
    }

    /// Per-region sums of `metrics` over the window (default: the configured totals window).
    pub fn region_totals(
        &self,
        metrics: &[&str],
        start: Option<&str>,
        end: Option<&str>,
    ) -> QueryResult<RecordsFrame> {
        self.observe(
            QueryKind::RegionTotals,
            self.series.row_count(),
            || {
                let window = DateWindow::from_request(start, end, self.config.totals_window)?;
                processing::region_totals(
                    &self.series,
                    &self.config.series,
                    metrics,
                    window,
                    &self.config.totals_label,
                )
            },
            RecordsFrame::row_count,
        )
    }

    /// Render an arbitrary table (e.g. a facility listing) as records.
    pub fn table_records(
        &self,
        table: &RecordTable,
        fill_nulls: bool,
    ) -> QueryResult<RecordsFrame> {
        self.observe(
            QueryKind::TableRecords,
            table.row_count(),
            || Ok(RecordsFrame::from_table(table, fill_nulls)),
            RecordsFrame::row_count,
        )
    }

    fn ranking_params(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        offset: Option<usize>,
        n: Option<usize>,
    ) -> QueryResult<(DateWindow, usize, usize)> {
        let defaults = &self.config.ranking;
        let window = DateWindow::from_request(start, end, defaults.window)?;
        Ok((
            window,
            offset.unwrap_or(defaults.offset),
            n.unwrap_or(defaults.top_n),
        ))
    }

    fn observe<T>(
        &self,
        kind: QueryKind,
        rows_scanned: usize,
        run: impl FnOnce() -> QueryResult<T>,
        output_len: impl FnOnce(&T) -> usize,
    ) -> QueryResult<T> {
        let span = tracing::info_span!("query", %kind, rows_scanned);
        let _enter = span.enter();

        let start = Instant::now();
        self.emit(QueryEvent::Started { kind });
        let result = run();
        let elapsed = start.elapsed();
        match &result {
            Ok(value) => self.emit(QueryEvent::Finished {
                kind,
                rows_scanned,
                output_len: output_len(value),
                elapsed,
            }),
            Err(error) => self.emit(QueryEvent::Failed {
                kind,
                error: error.clone(),
                elapsed,
            }),
        }
        result
    }

    fn emit(&self, event: QueryEvent) {
        if let Some(o) = &self.observer {
            o.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{QueryEngine, QueryEvent, QueryKind, QueryObserver};
    use crate::config::QueryConfig;
    use crate::error::QueryError;
    use crate::types::{DataType, Field, RecordTable, Schema, Value};
    use chrono::NaiveDate;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<QueryEvent>>);

    impl QueryObserver for Recorder {
        fn on_event(&self, event: &QueryEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn series() -> RecordTable {
        let day = |d| Value::Date(NaiveDate::from_ymd_opt(2020, 4, d).unwrap());
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("date", DataType::Date),
            Field::new("Confirmed", DataType::Int64),
        ]);
        RecordTable::new(
            schema,
            vec![
                vec![Value::Utf8("Ohio".into()), day(1), Value::Int64(10)],
                vec![Value::Utf8("Ohio".into()), day(2), Value::Int64(15)],
                vec![Value::Utf8("Ohio".into()), day(3), Value::Int64(22)],
            ],
        )
    }

    fn engine(recorder: Arc<Recorder>) -> QueryEngine {
        let categorical = RecordTable::empty(Schema::new(vec![]));
        QueryEngine::new(Arc::new(series()), Arc::new(categorical), QueryConfig::default())
            .with_observer(recorder)
    }

    #[test]
    fn delta_series_parses_request_dates() {
        let engine = engine(Arc::default());
        let out = engine
            .delta_series("Ohio", "Confirmed", Some("4/1/2020"), Some("04/03/2020"))
            .unwrap();
        assert_eq!(out.values, vec![5.0, 7.0]);
        assert_eq!(out.dates, vec!["2020-04-02", "2020-04-03"]);
    }

    #[test]
    fn successful_query_emits_started_then_finished() {
        let rec = Arc::new(Recorder::default());
        let engine = engine(Arc::clone(&rec));
        engine.range_aggregate("Ohio", "Confirmed", "4/1/2020", "4/3/2020").unwrap();

        let events = rec.0.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], QueryEvent::Started { kind: QueryKind::RangeAggregate });
        match &events[1] {
            QueryEvent::Finished {
                kind,
                rows_scanned,
                output_len,
                ..
            } => {
                assert_eq!(*kind, QueryKind::RangeAggregate);
                assert_eq!(*rows_scanned, 3);
                assert_eq!(*output_len, 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn malformed_date_is_reported_as_failure() {
        let rec = Arc::new(Recorder::default());
        let engine = engine(Arc::clone(&rec));
        let err = engine
            .delta_series("all", "Confirmed", Some("2020-04-01"), None)
            .unwrap_err();
        assert!(matches!(err, QueryError::MalformedDate { .. }));

        let events = rec.0.lock().unwrap();
        assert!(matches!(
            &events[1],
            QueryEvent::Failed { kind: QueryKind::DeltaSeries, error, .. } if *error == err
        ));
    }
}

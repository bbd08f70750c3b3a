use std::fmt;
use std::time::Duration;

use crate::error::QueryError;

/// The query entry points exposed by [`super::QueryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    DeltaSeries,
    RangeAggregate,
    Ranking,
    TopTrajectories,
    Proportions,
    RegionTotals,
    TableRecords,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeltaSeries => "delta_series",
            Self::RangeAggregate => "range_aggregate",
            Self::Ranking => "ranking",
            Self::TopTrajectories => "top_trajectories",
            Self::Proportions => "proportions",
            Self::RegionTotals => "region_totals",
            Self::TableRecords => "table_records",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    Started {
        kind: QueryKind,
    },
    Finished {
        kind: QueryKind,
        /// Rows of the source table the query ran over.
        rows_scanned: usize,
        /// Number of points, entries or rows in the result.
        output_len: usize,
        elapsed: Duration,
    },
    Failed {
        kind: QueryKind,
        error: QueryError,
        elapsed: Duration,
    },
}

/// Observer hook for query events.
///
/// Called synchronously on the thread running the query; implementations must not block.
pub trait QueryObserver: Send + Sync {
    fn on_event(&self, event: &QueryEvent);
}

/// Forwards query events to `tracing`.
#[derive(Debug, Default)]
pub struct LogQueryObserver;

impl QueryObserver for LogQueryObserver {
    fn on_event(&self, event: &QueryEvent) {
        match event {
            QueryEvent::Started { kind } => tracing::debug!(%kind, "query started"),
            QueryEvent::Finished {
                kind,
                rows_scanned,
                output_len,
                elapsed,
            } => tracing::info!(%kind, rows_scanned, output_len, ?elapsed, "query finished"),
            QueryEvent::Failed { kind, error, elapsed } => {
                tracing::warn!(%kind, %error, ?elapsed, "query failed")
            }
        }
    }
}

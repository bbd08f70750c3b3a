//! Query configuration: column names, category labels and default windows.
//!
//! Every default lives here as an explicit constant. Nothing is inferred from the data, so a
//! request without dates always sees the same window regardless of what was loaded.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::IngestionResult;
use crate::window::DateWindow;

/// Column names of the time-series table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeriesColumns {
    /// Region column (`Utf8`).
    pub region: String,
    /// Observation date column (`Date`).
    pub date: String,
}

impl Default for SeriesColumns {
    fn default() -> Self {
        Self {
            region: "name".to_string(),
            date: "date".to_string(),
        }
    }
}

/// Column names and labels of the categorical breakdown table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoricalColumns {
    pub region: String,
    pub sex: String,
    /// Bucket label column (age group).
    pub group: String,
    pub metric: String,
    pub male_label: String,
    pub female_label: String,
    /// Region label holding nation-wide rows; requests for `all` are answered from it.
    pub all_regions_label: String,
}

impl Default for CategoricalColumns {
    fn default() -> Self {
        Self {
            region: "state".to_string(),
            sex: "sex".to_string(),
            group: "age_group".to_string(),
            metric: "covid_19_deaths".to_string(),
            male_label: "Male".to_string(),
            female_label: "Female".to_string(),
            all_regions_label: "United States".to_string(),
        }
    }
}

/// Defaults for the top-N ranking query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RankingDefaults {
    pub window: DateWindow,
    /// Zero-based day offset into each region's window series.
    pub offset: usize,
    pub top_n: usize,
}

impl Default for RankingDefaults {
    fn default() -> Self {
        Self {
            window: default_delta_window(),
            offset: 14,
            top_n: 10,
        }
    }
}

/// Complete configuration for a [`crate::query::QueryEngine`].
///
/// Loadable from JSON; any omitted key keeps its default:
///
/// ```rust
/// use outbreak_metrics::config::QueryConfig;
///
/// let cfg = QueryConfig::from_json_str(r#"{ "series": { "region": "state" } }"#).unwrap();
/// assert_eq!(cfg.series.region, "state");
/// assert_eq!(cfg.series.date, "date");
/// assert_eq!(cfg.ranking.top_n, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub series: SeriesColumns,
    pub categorical: CategoricalColumns,
    /// Default window for delta and range-aggregate queries.
    pub delta_window: DateWindow,
    /// Default window for per-region totals.
    pub totals_window: DateWindow,
    /// Header of the region column in per-region totals.
    pub totals_label: String,
    pub ranking: RankingDefaults,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            series: SeriesColumns::default(),
            categorical: CategoricalColumns::default(),
            delta_window: default_delta_window(),
            totals_window: default_totals_window(),
            totals_label: "states".to_string(),
            ranking: RankingDefaults::default(),
        }
    }
}

impl QueryConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(input: &str) -> IngestionResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

// 2020-03-02 .. 2020-05-14: span covered by the daily US state reports.
fn default_delta_window() -> DateWindow {
    DateWindow::new(ymd(2020, 3, 2), ymd(2020, 5, 14))
}

fn default_totals_window() -> DateWindow {
    DateWindow::new(ymd(2020, 1, 1), ymd(2020, 5, 20))
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

//! Top-N ranking of regions by the value observed a fixed number of days into a window.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::SeriesColumns;
use crate::error::QueryResult;
use crate::series::{RankEntry, Ranking, RecordsFrame};
use crate::types::{cell, DataType, RecordTable, Value};
use crate::window::DateWindow;

use super::column_index;
use super::filter::filter_date_window;
use super::reduce::{reduce_daily, GroupKeys};

/// A region's reduced values, one slot per day of the enclosing [`RegionPanel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub region: String,
    /// Position of the region in discovery order.
    pub index: usize,
    /// `None` where the region has no report on that day.
    pub values: Vec<Option<f64>>,
}

impl RegionSeries {
    pub fn at(&self, day: usize) -> Option<f64> {
        self.values.get(day).copied().flatten()
    }
}

/// Per-region series laid out on a shared day axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPanel {
    /// Distinct dates present in the window, ascending.
    pub dates: Vec<NaiveDate>,
    /// Regions in order of first appearance in the source table.
    pub regions: Vec<RegionSeries>,
}

/// Reduced per-region series over `window`, aligned on the window's distinct dates.
///
/// Every region of `table` gets a series, even one with no value inside the window.
pub fn region_panel(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    window: DateWindow,
) -> QueryResult<RegionPanel> {
    let region_idx = column_index(table, &columns.region, DataType::Utf8)?;

    let mut names: Vec<&str> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for row in &table.rows {
        if let Some(r) = cell(row, region_idx).as_str() {
            slots.entry(r).or_insert_with(|| {
                names.push(r);
                names.len() - 1
            });
        }
    }

    let windowed = filter_date_window(table, &columns.date, window)?;
    let reduced = reduce_daily(&windowed, columns, metric, GroupKeys::DateRegion)?;
    let dates = reduced.dates();
    let day_of: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut regions: Vec<RegionSeries> = names
        .iter()
        .enumerate()
        .map(|(index, r)| RegionSeries {
            region: r.to_string(),
            index,
            values: vec![None; dates.len()],
        })
        .collect();
    for p in &reduced.points {
        let Some(&slot) = p.region.as_deref().and_then(|r| slots.get(r)) else {
            continue;
        };
        if let Some(&day) = day_of.get(&p.date) {
            regions[slot].values[day] = Some(p.value);
        }
    }

    Ok(RegionPanel { dates, regions })
}

/// Order regions by their value on the window's `offset`-th distinct date and keep the first `n`.
///
/// The offset indexes the dates that occur in the window, not calendar days from its start. A
/// region with no report on that date is left out. Ties keep discovery order.
pub fn rank(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    window: DateWindow,
    offset: usize,
    n: usize,
) -> QueryResult<Ranking> {
    let panel = region_panel(table, columns, metric, window)?;
    Ok(rank_panel(&panel, offset, n))
}

fn rank_panel(panel: &RegionPanel, offset: usize, n: usize) -> Ranking {
    let mut entries: Vec<RankEntry> = panel
        .regions
        .iter()
        .filter_map(|s| {
            s.at(offset).map(|value| RankEntry {
                value,
                region: s.region.clone(),
                index: s.index,
            })
        })
        .collect();
    // `sort_by` is stable.
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries.truncate(n);
    Ranking { entries }
}

/// Window trajectories of the top `n` regions, one row per window day.
///
/// Columns are the selected regions in rank order, then `total` (row sum) and `day` (index into
/// the window's distinct dates). Days on which any selected region has no value are skipped.
pub fn top_trajectories(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    window: DateWindow,
    offset: usize,
    n: usize,
) -> QueryResult<RecordsFrame> {
    let panel = region_panel(table, columns, metric, window)?;
    let ranking = rank_panel(&panel, offset, n);

    let selected: Vec<&RegionSeries> = ranking
        .entries
        .iter()
        .map(|e| &panel.regions[e.index])
        .collect();

    let mut frame_columns: Vec<String> = selected.iter().map(|s| s.region.clone()).collect();
    frame_columns.push("total".to_string());
    frame_columns.push("day".to_string());

    let mut rows = Vec::new();
    if !selected.is_empty() {
        for day in 0..panel.dates.len() {
            let Some(values) = selected.iter().map(|s| s.at(day)).collect::<Option<Vec<f64>>>()
            else {
                continue;
            };
            let total: f64 = values.iter().sum();
            let mut row: Vec<Value> = values.into_iter().map(Value::Float64).collect();
            row.push(Value::Float64(total));
            row.push(Value::Int64(day as i64));
            rows.push(row);
        }
    }

    Ok(RecordsFrame {
        columns: frame_columns,
        rows,
    })
}

//! Day-over-day differences and two-date changes over reduced series.

use chrono::NaiveDate;

use crate::config::SeriesColumns;
use crate::error::QueryResult;
use crate::series::{DeltaPoint, DeltaSeries, FilteredSeries};
use crate::types::RecordTable;
use crate::window::DateWindow;

use super::filter::{filter_date_window, filter_region, RegionFilter};
use super::reduce::{reduce_daily, GroupKeys};

/// Successive differences of a reduced series; the first date is dropped.
///
/// With `aggregate_across_regions`, each date's values are summed over regions before
/// differencing and every delta is reported as an absolute value. Otherwise the series is read as
/// a single region's counter (one value per date, the maximum if several are present) and
/// deltas are reported as-is, so a downward correction shows up as a negative delta.
pub fn delta(series: &FilteredSeries, aggregate_across_regions: bool) -> DeltaSeries {
    let mut per_date: Vec<(NaiveDate, f64)> = Vec::new();
    for p in &series.points {
        match per_date.last_mut() {
            Some((date, acc)) if *date == p.date => {
                *acc = if aggregate_across_regions {
                    *acc + p.value
                } else {
                    acc.max(p.value)
                };
            }
            _ => per_date.push((p.date, p.value)),
        }
    }

    let points = per_date
        .windows(2)
        .map(|pair| {
            let raw = pair[1].1 - pair[0].1;
            DeltaPoint {
                date: pair[1].0,
                delta: if aggregate_across_regions { raw.abs() } else { raw },
            }
        })
        .collect();
    DeltaSeries { points }
}

/// Day-over-day deltas of `metric` for one region, or for all regions combined.
///
/// Composes region filter, window filter, daily max reduction and [`delta`]. For
/// [`RegionFilter::All`] values are reduced per (date, region) and summed per date; for a named
/// region they are reduced per date. An unknown region or an inverted window gives an empty
/// series.
pub fn delta_series(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    region: &RegionFilter,
    window: DateWindow,
) -> QueryResult<DeltaSeries> {
    let scoped = filter_region(table, &columns.region, region)?;
    let windowed = filter_date_window(&scoped, &columns.date, window)?;
    let keys = if region.is_all() {
        GroupKeys::DateRegion
    } else {
        GroupKeys::Date
    };
    let series = reduce_daily(&windowed, columns, metric, keys)?;
    Ok(delta(&series, region.is_all()))
}

/// Change of `metric` between two specific days: the day-maximum at `end` minus the
/// day-maximum at `start`.
///
/// For [`RegionFilter::All`] each side is the sum of per-region maxima; a day without rows
/// counts as zero. For a named region, `None` is returned when either day has no value.
/// An inverted pair (`start > end`) also yields `None`.
pub fn range_aggregate(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    region: &RegionFilter,
    start: NaiveDate,
    end: NaiveDate,
) -> QueryResult<Option<f64>> {
    if start > end {
        return Ok(None);
    }
    let scoped = filter_region(table, &columns.region, region)?;
    let at_start = value_on(&scoped, columns, metric, region, start)?;
    let at_end = value_on(&scoped, columns, metric, region, end)?;
    Ok(match (at_start, at_end) {
        (Some(s), Some(e)) => Some(e - s),
        _ => None,
    })
}

fn value_on(
    table: &RecordTable,
    columns: &SeriesColumns,
    metric: &str,
    region: &RegionFilter,
    date: NaiveDate,
) -> QueryResult<Option<f64>> {
    let day = filter_date_window(table, &columns.date, DateWindow::new(date, date))?;
    Ok(match region {
        RegionFilter::All => {
            let per_region = reduce_daily(&day, columns, metric, GroupKeys::DateRegion)?;
            Some(per_region.points.iter().map(|p| p.value).sum())
        }
        RegionFilter::Named(_) => reduce_daily(&day, columns, metric, GroupKeys::Date)?
            .points
            .first()
            .map(|p| p.value),
    })
}

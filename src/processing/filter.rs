//! Row filtering for [`crate::types::RecordTable`] by date window and by region.

use crate::error::QueryResult;
use crate::types::{cell, DataType, RecordTable};
use crate::window::DateWindow;

use super::column_index;

/// Keep rows whose `date_column` lies within `window`, both bounds included.
///
/// An inverted window yields an empty table with the same schema. Rows with a null date never
/// match.
pub fn filter_date_window(
    table: &RecordTable,
    date_column: &str,
    window: DateWindow,
) -> QueryResult<RecordTable> {
    let idx = column_index(table, date_column, DataType::Date)?;
    if window.is_empty() {
        return Ok(RecordTable::empty(table.schema.clone()));
    }
    Ok(table.filter_rows(|row| matches!(cell(row, idx).as_date(), Some(d) if window.contains(d))))
}

/// Which regions a query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionFilter {
    All,
    Named(String),
}

impl RegionFilter {
    /// `""` and `"all"` select every region; anything else names one.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "all" {
            Self::All
        } else {
            Self::Named(raw.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Keep rows belonging to the selected region. [`RegionFilter::All`] returns a copy.
pub fn filter_region(
    table: &RecordTable,
    region_column: &str,
    region: &RegionFilter,
) -> QueryResult<RecordTable> {
    let idx = column_index(table, region_column, DataType::Utf8)?;
    Ok(match region {
        RegionFilter::All => table.clone(),
        RegionFilter::Named(name) => {
            table.filter_rows(|row| cell(row, idx).as_str() == Some(name.as_str()))
        }
    })
}

//! Inclusive date windows and request-date parsing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// Format of dates arriving in query parameters (`3/2/2020`, `05/14/2020`).
pub const REQUEST_DATE_FORMAT: &str = "%m/%d/%Y";

/// An inclusive `[start, end]` range of calendar days.
///
/// A window with `start > end` is valid and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `true` if `date` lies within the window, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `true` when the window is inverted and can match no date.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Build a window from optional request strings.
    ///
    /// A missing or blank bound takes the corresponding bound of `default`. A present but
    /// unparseable bound is an error; it is never replaced by the default.
    pub fn from_request(
        start: Option<&str>,
        end: Option<&str>,
        default: DateWindow,
    ) -> QueryResult<Self> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_request_date(raw)?,
            None => default.start,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_request_date(raw)?,
            None => default.end,
        };
        Ok(Self { start, end })
    }
}

/// Parse a `month/day/year` request date. Leading zeros are optional.
pub fn parse_request_date(raw: &str) -> QueryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), REQUEST_DATE_FORMAT).map_err(|_| {
        QueryError::MalformedDate {
            raw: raw.to_owned(),
            expected: "month/day/year",
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_request_date, DateWindow};
    use crate::error::QueryError;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_unpadded_and_padded_dates() {
        assert_eq!(parse_request_date("3/2/2020").unwrap(), ymd(2020, 3, 2));
        assert_eq!(parse_request_date("05/14/2020").unwrap(), ymd(2020, 5, 14));
    }

    #[test]
    fn rejects_iso_and_garbage() {
        for raw in ["2020-03-02", "13/1/2020", "yesterday"] {
            let err = parse_request_date(raw).unwrap_err();
            assert!(matches!(err, QueryError::MalformedDate { .. }), "{raw}");
        }
    }

    #[test]
    fn from_request_uses_defaults_only_for_absent_bounds() {
        let default = DateWindow::new(ymd(2020, 3, 2), ymd(2020, 5, 14));

        let w = DateWindow::from_request(None, Some(""), default).unwrap();
        assert_eq!(w, default);

        let w = DateWindow::from_request(Some("4/1/2020"), None, default).unwrap();
        assert_eq!(w, DateWindow::new(ymd(2020, 4, 1), ymd(2020, 5, 14)));

        assert!(DateWindow::from_request(Some("April"), None, default).is_err());
    }

    #[test]
    fn contains_is_inclusive_and_inverted_window_is_empty() {
        let w = DateWindow::new(ymd(2020, 4, 1), ymd(2020, 4, 3));
        assert!(w.contains(ymd(2020, 4, 1)));
        assert!(w.contains(ymd(2020, 4, 3)));
        assert!(!w.contains(ymd(2020, 3, 31)));
        assert!(!w.contains(ymd(2020, 4, 4)));

        let inverted = DateWindow::new(ymd(2020, 4, 3), ymd(2020, 4, 1));
        assert!(inverted.is_empty());
        assert!(!inverted.contains(ymd(2020, 4, 2)));
    }
}

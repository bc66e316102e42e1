//! Month timelines and timestamp parsing

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time handling errors
#[derive(Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Unrecognized date: {0}")]
    InvalidDate(String),

    #[error("Time range ends before it starts: {start} > {end}")]
    EmptyRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Parse the timestamp shapes the CMS hands out.
///
/// Accepts RFC 3339 (offset dropped after conversion to UTC),
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Like [`parse_timestamp`] but reports the offending input
pub fn parse_date_arg(text: &str) -> Result<NaiveDateTime, TimeError> {
    parse_timestamp(text).ok_or_else(|| TimeError::InvalidDate(text.to_string()))
}

/// Bucket label of a timestamp: `YYYY.M`
pub fn month_label(ts: &NaiveDateTime) -> String {
    format!("{}.{}", ts.year(), ts.month())
}

/// Format used when timestamps go into filter expressions
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn month_start(ts: &NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(*ts)
}

/// Inclusive publication window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, TimeError> {
        if start > end {
            return Err(TimeError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse user-supplied bounds. A bare date as `end` covers that whole day.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeError> {
        let from = parse_date_arg(start)?;
        let mut to = parse_date_arg(end)?;
        if NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d").is_ok() {
            to = to.date().and_hms_opt(23, 59, 59).unwrap_or(to);
        }
        Self::new(from, to)
    }

    /// The `months` calendar months ending with the month of `now`,
    /// starting on the first day of the earliest one and ending at `now`.
    pub fn last_months(now: NaiveDateTime, months: u32) -> Self {
        let back = months.saturating_sub(1);
        let start = month_start(&now)
            .checked_sub_months(Months::new(back))
            .unwrap_or_else(|| month_start(&now));
        Self { start, end: now }
    }

    /// Whether `ts` falls inside the window, bounds included
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Ordered month labels of a time range
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Timeline {
    labels: Vec<String>,
}

impl Timeline {
    /// One label per calendar month the range touches, from the month of
    /// `start` through the month of `end`.
    pub fn from_range(range: &TimeRange) -> Self {
        let mut labels = Vec::new();
        let mut cursor = month_start(&range.start);
        while cursor <= range.end {
            labels.push(month_label(&cursor));
            cursor = match cursor.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        Self { labels }
    }

    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(text: &str) -> NaiveDateTime {
        parse_timestamp(text).unwrap()
    }

    #[test]
    fn test_parse_shapes() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2023-01-05T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-05T10:30:00.000"), Some(expected));
        assert!(parse_timestamp("2023-01-05").is_some());
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label(&ts("2023-01-31T23:59:59")), "2023.1");
        assert_eq!(month_label(&ts("2022-12-01")), "2022.12");
    }

    #[test]
    fn test_last_twelve_months() {
        let range = TimeRange::last_months(ts("2023-06-15T09:00:00"), 12);
        assert_eq!(range.start, ts("2022-07-01"));
        let timeline = Timeline::from_range(&range);
        assert_eq!(timeline.len(), 12);
        assert_eq!(timeline.labels().first().unwrap(), "2022.7");
        assert_eq!(timeline.labels().last().unwrap(), "2023.6");
    }

    #[test]
    fn test_end_on_month_start_includes_that_month() {
        let range = TimeRange::new(ts("2023-01-01"), ts("2023-03-01")).unwrap();
        let timeline = Timeline::from_range(&range);
        assert_eq!(timeline.labels(), &["2023.1", "2023.2", "2023.3"]);
    }

    #[test]
    fn test_mid_month_start_covers_every_touched_month() {
        let range = TimeRange::parse("2023-01-20", "2023-03-05").unwrap();
        assert_eq!(
            Timeline::from_range(&range).labels(),
            &["2023.1", "2023.2", "2023.3"]
        );

        let range = TimeRange::parse("2022-11-30", "2023-01-01").unwrap();
        assert_eq!(
            Timeline::from_range(&range).labels(),
            &["2022.11", "2022.12", "2023.1"]
        );
    }

    #[test]
    fn test_single_instant_range() {
        let range = TimeRange::new(ts("2023-05-10"), ts("2023-05-10")).unwrap();
        assert_eq!(Timeline::from_range(&range).labels(), &["2023.5".to_string()]);
    }

    #[test]
    fn test_inverted_range() {
        let err = TimeRange::new(ts("2023-05-10"), ts("2023-01-10")).unwrap_err();
        assert!(matches!(err, TimeError::EmptyRange { .. }));
        assert!(parse_date_arg("yesterday").is_err());
    }

    #[test]
    fn test_parse_bounds() {
        let range = TimeRange::parse("2023-01-01", "2023-01-31").unwrap();
        assert_eq!(range.end, ts("2023-01-31T23:59:59"));
        let range = TimeRange::parse("2023-01-01", "2023-01-31T12:00:00").unwrap();
        assert_eq!(range.end, ts("2023-01-31T12:00:00"));
        assert!(matches!(
            TimeRange::parse("2023-02-01", "2023-01-01"),
            Err(TimeError::EmptyRange { .. })
        ));
        assert!(matches!(
            TimeRange::parse("soon", "2023-01-01"),
            Err(TimeError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = TimeRange::new(ts("2023-01-01"), ts("2023-01-31")).unwrap();
        assert!(range.contains(&ts("2023-01-01")));
        assert!(range.contains(&ts("2023-01-31")));
        assert!(!range.contains(&ts("2023-02-01")));
    }
}

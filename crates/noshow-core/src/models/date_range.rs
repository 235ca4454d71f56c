//! Date parsing and the inclusive query range.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp format of the APPT_DATE feed column, e.g. `1/5/24 9:30`.
pub const FEED_TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M";

/// Message shown when a user-entered bound cannot be parsed.
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Please use mm/dd/yyyy.";

/// A user-entered date bound that is not a valid `m/d/yyyy` calendar date.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid date format. Please use mm/dd/yyyy.")]
pub struct InvalidDate {
    /// The rejected input
    pub input: String,
}

/// Inclusive calendar-date range.
///
/// `start > end` is allowed and simply matches nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range without reordering the bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from `m/d/yyyy` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, InvalidDate> {
        Ok(Self::new(parse_user_date(start)?, parse_user_date(end)?))
    }

    /// True if `date` lies within both bounds.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when the bounds are inverted.
    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

/// Parse a `m/d/yyyy` date. Leading zeros are optional; the year must have
/// four digits.
pub fn parse_user_date(input: &str) -> Result<NaiveDate, InvalidDate> {
    let invalid = || InvalidDate {
        input: input.to_string(),
    };

    let mut parts = input.trim().split('/');
    let (Some(m), Some(d), Some(y), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    if !is_digits(m, 1, 2) || !is_digits(d, 1, 2) || !is_digits(y, 4, 4) {
        return Err(invalid());
    }

    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;
    let year: i32 = y.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parse an APPT_DATE value from the feed.
pub fn parse_feed_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), FEED_TIMESTAMP_FORMAT).ok()
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

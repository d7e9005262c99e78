//! # Calendar Arithmetic
//!
//! Whole-day arithmetic on date-only values.
//!
//! No time-of-day or timezone component is involved: a review date is a
//! calendar day. Presentation (hour of day, zone) is the store's concern.

use chrono::{Days, NaiveDate};

use crate::ScheduleError;
use crate::primitives::ISO_DATE_FORMAT;

/// Parse a `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// Add `days` calendar days to `date`.
///
/// Month lengths and leap years are handled by the calendar, and `days = 0`
/// returns `date` unchanged.
pub fn add_calendar_days(date: NaiveDate, days: u32) -> Result<NaiveDate, ScheduleError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or(ScheduleError::DateOverflow { date, days })
}

/// String form of [`add_calendar_days`]: `YYYY-MM-DD` in, `YYYY-MM-DD` out.
pub fn add_calendar_days_iso(anchor: &str, days: u32) -> Result<String, ScheduleError> {
    let date = parse_iso_date(anchor)?;
    add_calendar_days(date, days).map(format_iso_date)
}

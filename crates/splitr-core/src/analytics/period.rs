//! Analytics time windows
//!
//! All boundaries are computed in UTC.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::models::TimeRange;

/// Current and previous window starts for a time range.
///
/// The current period is `[start, ∞)`, the previous is `[previous_start, start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
}

pub fn window(range: TimeRange, now: DateTime<Utc>) -> Result<PeriodWindow> {
    match range {
        TimeRange::Week => Ok(PeriodWindow {
            start: now - Duration::days(7),
            previous_start: now - Duration::days(14),
        }),
        TimeRange::Month => {
            let start = month_start(now.year(), now.month())?;
            let previous_start = start
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| out_of_range(now))?;
            Ok(PeriodWindow {
                start,
                previous_start,
            })
        }
        TimeRange::Year => Ok(PeriodWindow {
            start: month_start(now.year(), 1)?,
            previous_start: month_start(now.year() - 1, 1)?,
        }),
    }
}

/// Midnight UTC on the first day of a month
pub fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}-{:02}", year, month)))
}

/// `[start, end)` bounds of the calendar month containing `at`
pub fn month_bounds(at: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = month_start(at.year(), at.month())?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| out_of_range(at))?;
    Ok((start, end))
}

/// Midnight UTC of the day containing `at`
pub fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or(at)
}

fn out_of_range(at: DateTime<Utc>) -> Error {
    Error::InvalidData(format!("Date out of range: {}", at))
}

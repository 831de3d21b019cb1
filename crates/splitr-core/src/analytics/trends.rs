//! Trend Calculator

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use super::aggregate::{involves_user, user_share};
use super::period::{day_start, month_start};
use crate::error::Result;
use crate::models::{Expense, TimeRange, TrendGrouping, TrendPoint};

/// Percentage change from `previous` to `current`, 0 when there is no baseline
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// Bucket a user's spending into a time series.
///
/// Supported combinations:
/// - week by day: 7 daily buckets ending today
/// - month by week: 4 weekly buckets starting on the 1st
/// - year by month: 12 monthly buckets
///
/// Any other combination produces an empty series.
pub fn spending_trends(
    expenses: &[Expense],
    user_id: i64,
    range: TimeRange,
    group_by: TrendGrouping,
    now: DateTime<Utc>,
) -> Result<Vec<TrendPoint>> {
    let buckets = bucket_bounds(range, group_by, now)?;

    let points = buckets
        .into_iter()
        .map(|(start, end)| {
            let mut point = TrendPoint {
                period: start,
                total_spent: 0.0,
                expense_count: 0,
            };
            for expense in expenses
                .iter()
                .filter(|e| e.date >= start && e.date < end && involves_user(e, user_id))
            {
                point.total_spent += user_share(expense, user_id);
                point.expense_count += 1;
            }
            point
        })
        .collect();

    Ok(points)
}

/// Earliest instant covered by the buckets for a range/grouping pair
pub fn series_start(
    range: TimeRange,
    group_by: TrendGrouping,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    Ok(bucket_bounds(range, group_by, now)?
        .first()
        .map(|(start, _)| *start))
}

fn bucket_bounds(
    range: TimeRange,
    group_by: TrendGrouping,
    now: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
    let bounds = match (range, group_by) {
        (TimeRange::Week, TrendGrouping::Day) => {
            let today = day_start(now);
            (0..7)
                .rev()
                .map(|i| {
                    let start = today - Duration::days(i);
                    (start, start + Duration::days(1))
                })
                .collect()
        }
        (TimeRange::Month, TrendGrouping::Week) => {
            let first = month_start(now.year(), now.month())?;
            (0..4)
                .map(|i| {
                    let start = first + Duration::days(7 * i);
                    (start, start + Duration::days(7))
                })
                .collect()
        }
        (TimeRange::Year, TrendGrouping::Month) => {
            let mut bounds = Vec::with_capacity(12);
            for month in 1..=12 {
                let start = month_start(now.year(), month)?;
                let end = match start.checked_add_months(Months::new(1)) {
                    Some(end) => end,
                    None => break,
                };
                bounds.push((start, end));
            }
            bounds
        }
        _ => Vec::new(),
    };

    Ok(bounds)
}

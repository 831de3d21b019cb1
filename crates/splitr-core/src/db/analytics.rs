//! Spending analytics backed by a per-user cache

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{from_millis, to_millis, Database};
use crate::analytics::{self, trends};
use crate::error::Result;
use crate::models::{ExpenseAnalytics, TimeRange, TrendGrouping, TrendPoint};

impl Database {
    /// Analytics for a time range, served from cache while it is fresh.
    ///
    /// An entry is fresh when it was computed less than the configured TTL
    /// before `now`. Expense writes do not invalidate the cache.
    pub fn expense_analytics(
        &self,
        user_id: i64,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<ExpenseAnalytics> {
        if let Some((data, last_updated)) = self.cached_analytics(user_id, range)? {
            if now - last_updated < self.config().cache_ttl() {
                tracing::debug!(user_id, range = %range, "Analytics cache hit");
                return Ok(data);
            }
        }

        let window = analytics::window(range, now)?;
        let current = self.expenses_involving_user(user_id, window.start, None)?;
        let previous =
            self.expenses_involving_user(user_id, window.previous_start, Some(window.start))?;

        let result = analytics::build_analytics(&current, &previous, user_id);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO analytics_cache (user_id, time_range, data, last_updated)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id, time_range)
            DO UPDATE SET data = excluded.data, last_updated = excluded.last_updated
            "#,
            params![
                user_id,
                range.as_str(),
                serde_json::to_string(&result)?,
                to_millis(now)
            ],
        )?;

        tracing::debug!(
            user_id,
            range = %range,
            current = current.len(),
            previous = previous.len(),
            "Computed analytics"
        );
        Ok(result)
    }

    fn cached_analytics(
        &self,
        user_id: i64,
        range: TimeRange,
    ) -> Result<Option<(ExpenseAnalytics, DateTime<Utc>)>> {
        let conn = self.conn()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT data, last_updated FROM analytics_cache WHERE user_id = ? AND time_range = ?",
                params![user_id, range.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((data, last_updated)) => match serde_json::from_str(&data) {
                Ok(parsed) => Ok(Some((parsed, from_millis(last_updated)))),
                Err(e) => {
                    // Stale shape from an older build; recompute
                    tracing::warn!(user_id, error = %e, "Discarding unreadable analytics cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Time-bucketed spending series (not cached)
    pub fn spending_trends(
        &self,
        user_id: i64,
        range: TimeRange,
        group_by: TrendGrouping,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>> {
        let start = match trends::series_start(range, group_by, now)? {
            Some(start) => start,
            None => return Ok(Vec::new()),
        };

        let expenses = self.expenses_involving_user(user_id, start, None)?;
        trends::spending_trends(&expenses, user_id, range, group_by, now)
    }

    /// Drop all cached analytics for a user, returning the number removed
    pub fn clear_analytics_cache(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM analytics_cache WHERE user_id = ?",
            params![user_id],
        )?;
        Ok(removed)
    }
}

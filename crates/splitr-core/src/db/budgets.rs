//! Budget operations

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{from_millis, to_millis, Database};
use crate::analytics::{self, period};
use crate::error::{Error, Result};
use crate::models::{Budget, BudgetOverviewEntry};

const BUDGET_COLUMNS: &str =
    "id, user_id, category, monthly_limit, year, month, spent, last_updated";

fn row_to_budget(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        monthly_limit: row.get(3)?,
        year: row.get(4)?,
        month: row.get(5)?,
        spent: row.get(6)?,
        last_updated: from_millis(row.get(7)?),
    })
}

/// Atomically add `amount` to the user's budget for the month containing `at`.
///
/// Returns false when no budget exists for that category and month.
pub(crate) fn increment_budget_spent(
    conn: &Connection,
    user_id: i64,
    category: &str,
    amount: f64,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let updated = conn.execute(
        r#"
        UPDATE budgets SET spent = spent + ?, last_updated = ?
        WHERE user_id = ? AND category = ? AND year = ? AND month = ?
        "#,
        params![amount, to_millis(now), user_id, category, at.year(), at.month()],
    )?;
    Ok(updated > 0)
}

impl Database {
    /// Set the monthly limit for a category in the month containing `now`.
    ///
    /// Updates the limit in place when a budget already exists, keeping its
    /// spent total.
    pub fn set_budget(
        &self,
        user_id: i64,
        category: &str,
        monthly_limit: f64,
        now: DateTime<Utc>,
    ) -> Result<Budget> {
        let category = category.trim();
        if category.is_empty() {
            return Err(Error::InvalidData("Budget category is required".into()));
        }
        if !monthly_limit.is_finite() || monthly_limit < 0.0 {
            return Err(Error::InvalidData(format!(
                "Monthly limit must be a non-negative number, got {}",
                monthly_limit
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category, monthly_limit, year, month, spent, last_updated)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            ON CONFLICT(user_id, category, year, month)
            DO UPDATE SET monthly_limit = excluded.monthly_limit, last_updated = excluded.last_updated
            "#,
            params![
                user_id,
                category,
                monthly_limit,
                now.year(),
                now.month(),
                to_millis(now)
            ],
        )?;

        let budget = conn
            .query_row(
                &format!(
                    "SELECT {} FROM budgets WHERE user_id = ? AND category = ? AND year = ? AND month = ?",
                    BUDGET_COLUMNS
                ),
                params![user_id, category, now.year(), now.month()],
                row_to_budget,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Budget for {}", category)))?;

        tracing::debug!(user_id, category, monthly_limit, "Set budget");
        Ok(budget)
    }

    /// Budgets for one calendar month, ordered by category
    pub fn list_budgets(&self, user_id: i64, year: i32, month: u32) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ? AND year = ? AND month = ? ORDER BY category",
            BUDGET_COLUMNS
        ))?;

        let budgets = stmt
            .query_map(params![user_id, year, month], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(budgets)
    }

    /// Add spend to the matching budget, if one exists
    pub fn record_budget_spend(
        &self,
        user_id: i64,
        category: &str,
        amount: f64,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.conn()?;
        increment_budget_spent(&conn, user_id, category, amount, at, Utc::now())
    }

    /// The user's share of spending per category for the month containing `at`
    pub fn monthly_spending_by_category(
        &self,
        user_id: i64,
        at: DateTime<Utc>,
    ) -> Result<BTreeMap<String, f64>> {
        let (start, end) = period::month_bounds(at)?;
        let expenses = self.expenses_involving_user(user_id, start, Some(end))?;
        Ok(analytics::aggregate(&expenses, user_id).by_category)
    }

    /// Evaluate this month's budgets against this month's spending
    pub fn budget_overview(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, BudgetOverviewEntry>> {
        let budgets = self.list_budgets(user_id, now.year(), now.month())?;
        let spending = self.monthly_spending_by_category(user_id, now)?;
        Ok(analytics::evaluate_budgets(&budgets, &spending))
    }
}

//! Expense operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::budgets::increment_budget_spent;
use super::{enum_column, from_millis, to_millis, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense, ReceiptData, Split};

pub(crate) const EXPENSE_COLUMNS: &str = "e.id, e.description, e.amount, e.category, e.date, e.paid_by, e.created_by, e.split_type, e.group_id, e.receipt_image_url, e.receipt_data, e.recurring_id, e.created_at";

/// Filter for expense listings
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Inclusive lower bound on the expense date
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the expense date
    pub until: Option<DateTime<Utc>>,
    /// Only expenses the user paid for (otherwise payer or split participant)
    pub paid_by_only: bool,
    pub limit: Option<i64>,
}

impl ExpenseFilter {
    pub fn between(from: DateTime<Utc>, until: Option<DateTime<Utc>>) -> Self {
        Self {
            from: Some(from),
            until,
            ..Default::default()
        }
    }
}

pub(crate) fn row_to_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let receipt_data: Option<String> = row.get(10)?;
    let receipt_data = receipt_data
        .map(|raw| {
            serde_json::from_str::<ReceiptData>(&raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    10,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
        })
        .transpose()?;

    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        date: from_millis(row.get(4)?),
        paid_by: row.get(5)?,
        created_by: row.get(6)?,
        split_type: enum_column(row, 7)?,
        splits: Vec::new(),
        group_id: row.get(8)?,
        receipt_image_url: row.get(9)?,
        receipt_data,
        recurring_id: row.get(11)?,
        created_at: from_millis(row.get(12)?),
    })
}

pub(crate) fn load_splits(conn: &Connection, expense_id: i64) -> Result<Vec<Split>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, amount, paid FROM expense_splits WHERE expense_id = ? ORDER BY position",
    )?;
    let splits = stmt
        .query_map(params![expense_id], |row| {
            Ok(Split {
                user_id: row.get(0)?,
                amount: row.get(1)?,
                paid: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(splits)
}

/// Run an expense query and attach splits to each row
pub(crate) fn query_expenses(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(sql)?;
    let mut expenses = stmt
        .query_map(params, row_to_expense)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for expense in &mut expenses {
        expense.splits = load_splits(conn, expense.id)?;
    }
    Ok(expenses)
}

/// Validate and insert an expense, then add each participant's share to
/// their budget for the expense's month.
///
/// Runs on the caller's connection so it can join a wider transaction.
pub(crate) fn insert_expense(
    conn: &Connection,
    expense: &NewExpense,
    created_by: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    expense.validate()?;

    let mut user_ids: Vec<i64> = expense.splits.iter().map(|s| s.user_id).collect();
    user_ids.push(expense.paid_by);
    user_ids.push(created_by);
    user_ids.sort_unstable();
    user_ids.dedup();
    for user_id in &user_ids {
        let exists: Option<i64> = conn
            .query_row("SELECT id FROM users WHERE id = ?", params![user_id], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_none() {
            return Err(Error::InvalidData(format!("Unknown user: {}", user_id)));
        }
    }

    if let Some(group_id) = expense.group_id {
        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM expense_groups WHERE id = ?",
                params![group_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("Group {}", group_id)));
        }
    }

    conn.execute(
        r#"
        INSERT INTO expenses (description, amount, category, date, paid_by, created_by,
                              split_type, group_id, recurring_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            expense.description.trim(),
            expense.amount,
            expense.category,
            to_millis(expense.date),
            expense.paid_by,
            created_by,
            expense.split_type.as_str(),
            expense.group_id,
            expense.recurring_id,
            to_millis(now),
        ],
    )?;
    let expense_id = conn.last_insert_rowid();

    let category = expense
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(crate::analytics::DEFAULT_CATEGORY);

    for (position, split) in expense.splits.iter().enumerate() {
        conn.execute(
            "INSERT INTO expense_splits (expense_id, position, user_id, amount, paid) VALUES (?, ?, ?, ?, ?)",
            params![expense_id, position as i64, split.user_id, split.amount, split.paid],
        )?;
        increment_budget_spent(conn, split.user_id, category, split.amount, expense.date, now)?;
    }

    Ok(expense_id)
}

impl Database {
    /// Create an expense, updating participants' budgets in the same transaction
    pub fn create_expense(&self, expense: &NewExpense, created_by: i64) -> Result<Expense> {
        let now = Utc::now();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let id = insert_expense(&tx, expense, created_by, now)?;
        tx.commit()?;
        drop(conn);

        tracing::debug!(expense_id = id, amount = expense.amount, "Created expense");
        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        let expense = conn
            .query_row(
                &format!("SELECT {} FROM expenses e WHERE e.id = ?", EXPENSE_COLUMNS),
                params![id],
                row_to_expense,
            )
            .optional()?;

        match expense {
            Some(mut expense) => {
                expense.splits = load_splits(&conn, expense.id)?;
                Ok(Some(expense))
            }
            None => Ok(None),
        }
    }

    /// Expenses involving a user (payer or split participant), newest first
    pub fn list_expenses_for_user(
        &self,
        user_id: i64,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let involvement = if filter.paid_by_only {
            "e.paid_by = ?1"
        } else {
            "(e.paid_by = ?1 OR EXISTS (SELECT 1 FROM expense_splits s WHERE s.expense_id = e.id AND s.user_id = ?1))"
        };

        let mut sql = format!(
            "SELECT {} FROM expenses e WHERE {} AND e.date >= ?2 AND e.date < ?3 ORDER BY e.date DESC, e.id DESC",
            EXPENSE_COLUMNS, involvement
        );
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit.max(0)));
        }

        let from = filter.from.map(to_millis).unwrap_or(i64::MIN);
        let until = filter.until.map(to_millis).unwrap_or(i64::MAX);
        query_expenses(&conn, &sql, &[&user_id, &from, &until])
    }

    /// Expenses involving a user dated in `[start, end)`
    pub fn expenses_involving_user(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Expense>> {
        self.list_expenses_for_user(user_id, &ExpenseFilter::between(start, end))
    }
}

//! Recurring expense templates

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::expenses::insert_expense;
use super::{enum_column, from_millis, json_column, to_millis, Database};
use crate::analytics::recurrence::plan_materialization;
use crate::error::{Error, Result};
use crate::models::{Expense, NewRecurringExpense, RecurringExpense};

const RECURRING_COLUMNS: &str = "id, user_id, description, amount, category, frequency, participants, group_id, split_type, splits, next_due, last_created, is_active, created_at";

/// Result of turning a template into an expense
#[derive(Debug, Clone, Serialize)]
pub struct MaterializeOutcome {
    pub expense: Expense,
    pub template: RecurringExpense,
}

fn row_to_recurring(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecurringExpense> {
    let last_created: Option<i64> = row.get(11)?;
    Ok(RecurringExpense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        frequency: enum_column(row, 5)?,
        participants: json_column(row, 6)?,
        group_id: row.get(7)?,
        split_type: enum_column(row, 8)?,
        splits: json_column(row, 9)?,
        next_due: from_millis(row.get(10)?),
        last_created: last_created.map(from_millis),
        is_active: row.get(12)?,
        created_at: from_millis(row.get(13)?),
    })
}

fn fetch_recurring(conn: &Connection, id: i64) -> Result<Option<RecurringExpense>> {
    let template = conn
        .query_row(
            &format!(
                "SELECT {} FROM recurring_expenses WHERE id = ?",
                RECURRING_COLUMNS
            ),
            params![id],
            row_to_recurring,
        )
        .optional()?;
    Ok(template)
}

/// Load a template and check that `user_id` owns it
fn fetch_owned(conn: &Connection, id: i64, user_id: i64) -> Result<RecurringExpense> {
    let template = fetch_recurring(conn, id)?
        .ok_or_else(|| Error::NotFound(format!("Recurring expense {}", id)))?;
    if template.user_id != user_id {
        return Err(Error::Unauthorized(format!(
            "Recurring expense {} belongs to another user",
            id
        )));
    }
    Ok(template)
}

impl Database {
    /// Create a template; the first occurrence is one interval from `now`
    pub fn create_recurring(
        &self,
        user_id: i64,
        new: &NewRecurringExpense,
        now: DateTime<Utc>,
    ) -> Result<RecurringExpense> {
        new.validate()?;
        let next_due = new.frequency.advance(now)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring_expenses (user_id, description, amount, category, frequency,
                participants, group_id, split_type, splits, next_due, last_created, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, 1, ?)
            "#,
            params![
                user_id,
                new.description.trim(),
                new.amount,
                new.category,
                new.frequency.as_str(),
                serde_json::to_string(&new.participants)?,
                new.group_id,
                new.split_type.as_str(),
                serde_json::to_string(&new.splits)?,
                to_millis(next_due),
                to_millis(now),
            ],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!(id, frequency = %new.frequency, next_due = %next_due, "Created recurring expense");
        fetch_recurring(&conn, id)?
            .ok_or_else(|| Error::NotFound(format!("Recurring expense {}", id)))
    }

    pub fn get_recurring(&self, id: i64) -> Result<Option<RecurringExpense>> {
        let conn = self.conn()?;
        fetch_recurring(&conn, id)
    }

    /// The user's templates, soonest due first
    pub fn list_recurring(&self, user_id: i64) -> Result<Vec<RecurringExpense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recurring_expenses WHERE user_id = ? ORDER BY next_due ASC, id ASC",
            RECURRING_COLUMNS
        ))?;

        let templates = stmt
            .query_map(params![user_id], row_to_recurring)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    /// Set a template's active flag; the due date is left alone
    pub fn set_recurring_active(
        &self,
        id: i64,
        user_id: i64,
        is_active: bool,
    ) -> Result<RecurringExpense> {
        let conn = self.conn()?;
        let mut template = fetch_owned(&conn, id, user_id)?;

        conn.execute(
            "UPDATE recurring_expenses SET is_active = ? WHERE id = ?",
            params![is_active, id],
        )?;
        template.is_active = is_active;
        Ok(template)
    }

    /// Create the expense for a template and move its due date forward.
    ///
    /// The expense insert, budget updates and template update share one
    /// transaction.
    pub fn materialize_recurring(
        &self,
        id: i64,
        acting_user: i64,
        now: DateTime<Utc>,
    ) -> Result<MaterializeOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut template = fetch_recurring(&tx, id)?
            .ok_or_else(|| Error::NotFound(format!("Recurring expense {}", id)))?;
        let plan = plan_materialization(&template, acting_user, now)?;

        let expense_id = insert_expense(&tx, &plan.expense, acting_user, now)?;
        tx.execute(
            "UPDATE recurring_expenses SET next_due = ?, last_created = ? WHERE id = ?",
            params![to_millis(plan.next_due), to_millis(plan.last_created), id],
        )?;
        tx.commit()?;
        drop(conn);

        template.next_due = plan.next_due;
        template.last_created = Some(plan.last_created);

        tracing::info!(
            recurring_id = id,
            expense_id,
            next_due = %plan.next_due,
            "Materialized recurring expense"
        );

        let expense = self
            .get_expense(expense_id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", expense_id)))?;
        Ok(MaterializeOutcome { expense, template })
    }

    /// All active templates due at or before `now`, across users
    pub fn list_due_recurring(&self, now: DateTime<Utc>) -> Result<Vec<RecurringExpense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM recurring_expenses WHERE is_active = 1 AND next_due <= ? ORDER BY next_due ASC, id ASC",
            RECURRING_COLUMNS
        ))?;

        let templates = stmt
            .query_map(params![to_millis(now)], row_to_recurring)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    pub fn delete_recurring(&self, id: i64, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        fetch_owned(&conn, id, user_id)?;
        conn.execute("DELETE FROM recurring_expenses WHERE id = ?", params![id])?;
        tracing::debug!(id, "Deleted recurring expense");
        Ok(())
    }

    /// Materialize every due template on behalf of its owner.
    ///
    /// A failing template is logged and skipped.
    pub fn materialize_due_recurring(&self, now: DateTime<Utc>) -> Result<Vec<MaterializeOutcome>> {
        let due = self.list_due_recurring(now)?;
        let mut outcomes = Vec::with_capacity(due.len());

        for template in due {
            match self.materialize_recurring(template.id, template.user_id, now) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!(recurring_id = template.id, error = %e, "Failed to materialize recurring expense");
                }
            }
        }

        Ok(outcomes)
    }
}

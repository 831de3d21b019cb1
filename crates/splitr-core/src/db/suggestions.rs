//! Expense suggestion operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::expenses::insert_expense;
use super::{enum_column, from_millis, json_column, to_millis, Database, ExpenseFilter};
use crate::analytics::SuggestionMiner;
use crate::error::{Error, Result};
use crate::models::{Expense, NewExpense, Suggestion};

const SUGGESTION_COLUMNS: &str = "id, user_id, description, category, avg_amount, frequency, confidence, based_on_expenses, last_suggested, is_active";

fn row_to_suggestion(row: &rusqlite::Row<'_>) -> rusqlite::Result<Suggestion> {
    Ok(Suggestion {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        avg_amount: row.get(4)?,
        frequency: enum_column(row, 5)?,
        confidence: row.get(6)?,
        based_on_expenses: json_column(row, 7)?,
        last_suggested: from_millis(row.get(8)?),
        is_active: row.get(9)?,
    })
}

fn fetch_owned(conn: &Connection, id: i64, user_id: i64) -> Result<Suggestion> {
    let suggestion = conn
        .query_row(
            &format!(
                "SELECT {} FROM expense_suggestions WHERE id = ?",
                SUGGESTION_COLUMNS
            ),
            params![id],
            row_to_suggestion,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Suggestion {}", id)))?;

    if suggestion.user_id != user_id {
        return Err(Error::Unauthorized(format!(
            "Suggestion {} belongs to another user",
            id
        )));
    }
    Ok(suggestion)
}

impl Database {
    /// Mine the user's recent expenses and replace their suggestion set.
    ///
    /// Prior suggestions, including dismissed ones, are deleted. Returns the
    /// number of suggestions stored.
    pub fn generate_suggestions(&self, user_id: i64, now: DateTime<Utc>) -> Result<usize> {
        let config = self.config();
        let window_start = now - config.suggestion_window();
        let expenses = self.list_expenses_for_user(
            user_id,
            &ExpenseFilter {
                from: Some(window_start),
                paid_by_only: true,
                ..Default::default()
            },
        )?;

        let mined = SuggestionMiner::new(config.max_stored_suggestions).mine(&expenses, user_id);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM expense_suggestions WHERE user_id = ?",
            params![user_id],
        )?;

        for suggestion in &mined {
            tx.execute(
                r#"
                INSERT INTO expense_suggestions (user_id, description, category, avg_amount,
                    frequency, confidence, based_on_expenses, last_suggested, is_active)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
                "#,
                params![
                    user_id,
                    suggestion.description,
                    suggestion.category,
                    suggestion.avg_amount,
                    suggestion.frequency.as_str(),
                    suggestion.confidence,
                    serde_json::to_string(&suggestion.based_on_expenses)?,
                    to_millis(now),
                ],
            )?;
        }
        tx.commit()?;

        tracing::info!(
            user_id,
            scanned = expenses.len(),
            removed,
            stored = mined.len(),
            "Regenerated suggestions"
        );
        Ok(mined.len())
    }

    /// Active suggestions, most confident first
    pub fn list_suggestions(&self, user_id: i64) -> Result<Vec<Suggestion>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expense_suggestions WHERE user_id = ? AND is_active = 1 ORDER BY confidence DESC, id ASC LIMIT ?",
            SUGGESTION_COLUMNS
        ))?;

        let limit = self.config().max_listed_suggestions as i64;
        let suggestions = stmt
            .query_map(params![user_id, limit], row_to_suggestion)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(suggestions)
    }

    /// Create an equal-split expense from a suggestion.
    ///
    /// The amount defaults to the suggestion's average. The suggestion is
    /// stamped and deactivated in the same transaction as the expense insert.
    pub fn use_suggestion(
        &self,
        id: i64,
        user_id: i64,
        amount: Option<f64>,
        participants: &[i64],
        group_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Expense> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let suggestion = fetch_owned(&tx, id, user_id)?;

        let amount = amount.unwrap_or(suggestion.avg_amount);
        let mut expense = NewExpense::equal_split(
            &suggestion.description,
            amount,
            suggestion.category.clone(),
            now,
            user_id,
            participants,
        )?;
        expense.group_id = group_id;

        let expense_id = insert_expense(&tx, &expense, user_id, now)?;
        tx.execute(
            "UPDATE expense_suggestions SET last_suggested = ?, is_active = 0 WHERE id = ?",
            params![to_millis(now), id],
        )?;
        tx.commit()?;
        drop(conn);

        tracing::debug!(suggestion_id = id, expense_id, "Used suggestion");
        self.get_expense(expense_id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", expense_id)))
    }

    pub fn dismiss_suggestion(&self, id: i64, user_id: i64) -> Result<()> {
        let conn = self.conn()?;
        fetch_owned(&conn, id, user_id)?;
        conn.execute(
            "UPDATE expense_suggestions SET is_active = 0 WHERE id = ?",
            params![id],
        )?;
        Ok(())
    }
}

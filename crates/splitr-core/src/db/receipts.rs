//! Receipt attachment operations

use rusqlite::{params, OptionalExtension};

use super::expenses::{query_expenses, EXPENSE_COLUMNS};
use super::Database;
use crate::error::{Error, Result};
use crate::models::{Expense, ReceiptAnalysis, ReceiptData};
use crate::receipts::analyze_receipts;

impl Database {
    /// Attach a scanned receipt to an expense the user created
    pub fn attach_receipt(
        &self,
        expense_id: i64,
        user_id: i64,
        image_url: &str,
        data: &ReceiptData,
    ) -> Result<Expense> {
        if image_url.trim().is_empty() {
            return Err(Error::InvalidData("Receipt image URL is required".into()));
        }

        let conn = self.conn()?;
        let created_by: i64 = conn
            .query_row(
                "SELECT created_by FROM expenses WHERE id = ?",
                params![expense_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", expense_id)))?;

        if created_by != user_id {
            return Err(Error::Unauthorized(format!(
                "Expense {} was created by another user",
                expense_id
            )));
        }

        conn.execute(
            "UPDATE expenses SET receipt_image_url = ?, receipt_data = ? WHERE id = ?",
            params![image_url, serde_json::to_string(data)?, expense_id],
        )?;
        drop(conn);

        tracing::debug!(expense_id, "Attached receipt");
        self.get_expense(expense_id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", expense_id)))
    }

    /// Expenses with a receipt that the user paid for or created, newest first
    pub fn list_expenses_with_receipts(&self, user_id: i64) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM expenses e
            WHERE e.receipt_image_url IS NOT NULL AND (e.paid_by = ?1 OR e.created_by = ?1)
            ORDER BY e.date DESC, e.id DESC
            "#,
            EXPENSE_COLUMNS
        );
        query_expenses(&conn, &sql, &[&user_id])
    }

    /// Summary of receipts on expenses the user paid for
    pub fn receipt_analysis(&self, user_id: i64) -> Result<ReceiptAnalysis> {
        let paid: Vec<Expense> = self
            .list_expenses_with_receipts(user_id)?
            .into_iter()
            .filter(|e| e.paid_by == user_id)
            .collect();
        Ok(analyze_receipts(&paid))
    }
}

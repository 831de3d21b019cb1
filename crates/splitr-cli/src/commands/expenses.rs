//! Expense commands (add, list)

use anyhow::Result;
use chrono::Utc;
use splitr_core::db::{Database, ExpenseFilter};
use splitr_core::models::{NewExpense, User};

use super::{participant_ids, parse_date, truncate};

/// Record an expense split equally between the user and `with`
#[allow(clippy::too_many_arguments)]
pub fn cmd_expenses_add(
    db: &Database,
    user: &User,
    description: &str,
    amount: f64,
    category: Option<String>,
    with: &[String],
    paid_by: Option<&str>,
    date: Option<&str>,
    group: Option<i64>,
) -> Result<()> {
    let participants = participant_ids(db, user, with)?;
    let payer = match paid_by {
        Some(email) => db.get_or_create_user(email)?,
        None => user.clone(),
    };
    let date = match date {
        Some(d) => parse_date(d)?,
        None => Utc::now(),
    };

    if let Some(group_id) = group {
        if !db.is_group_member(group_id, user.id)? {
            anyhow::bail!("You are not a member of group {}", group_id);
        }
    }

    let mut expense = NewExpense::equal_split(
        description,
        amount,
        category,
        date,
        payer.id,
        &participants,
    )?;
    expense.group_id = group;

    let created = db.create_expense(&expense, user.id)?;
    db.log_audit(
        &user.email,
        "create",
        Some("expense"),
        Some(created.id),
        Some(&format!("amount={:.2}, source=cli", created.amount)),
    )?;

    println!(
        "✅ Recorded expense #{}: {} ${:.2}",
        created.id, created.description, created.amount
    );
    println!(
        "   Paid by {}, split {} ways (${:.2} each)",
        payer.email,
        created.splits.len(),
        created.amount / created.splits.len() as f64
    );

    Ok(())
}

/// List expenses involving the user, newest first
pub fn cmd_expenses_list(db: &Database, user: &User, limit: i64, paid_by_me: bool) -> Result<()> {
    let filter = ExpenseFilter {
        paid_by_only: paid_by_me,
        limit: Some(limit.max(1)),
        ..Default::default()
    };
    let expenses = db.list_expenses_for_user(user.id, &filter)?;

    if expenses.is_empty() {
        println!("No expenses yet. Add one with: splitr expenses add <description> <amount>");
        return Ok(());
    }

    println!("\n💸 Expenses ({})", expenses.len());
    println!("{}", "─".repeat(70));

    for expense in &expenses {
        let share = expense
            .splits
            .iter()
            .find(|s| s.user_id == user.id)
            .map(|s| format!("your share ${:.2}", s.amount))
            .unwrap_or_else(|| "no share".to_string());
        let payer = if expense.paid_by == user.id {
            "you paid"
        } else {
            "owed"
        };

        println!(
            "  #{:<5} {}  {:<28} ${:>9.2}  [{}] {}, {}",
            expense.id,
            expense.date.format("%Y-%m-%d"),
            truncate(&expense.description, 28),
            expense.amount,
            expense.category_or_default(),
            share,
            payer
        );
        if expense.receipt_image_url.is_some() {
            println!("         📷 receipt attached");
        }
    }

    println!();
    Ok(())
}

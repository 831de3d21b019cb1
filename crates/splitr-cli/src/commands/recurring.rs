//! Recurring expense commands

use anyhow::{anyhow, Result};
use chrono::Utc;
use splitr_core::analytics::equal_template_splits;
use splitr_core::db::Database;
use splitr_core::models::{Frequency, NewRecurringExpense, SplitType, User};

use super::{participant_ids, truncate};

pub fn cmd_recurring_add(
    db: &Database,
    user: &User,
    description: &str,
    amount: f64,
    category: &str,
    frequency: &str,
    with: &[String],
) -> Result<()> {
    let frequency: Frequency = frequency.parse().map_err(|e: String| anyhow!(e))?;
    let participants = participant_ids(db, user, with)?;

    let new = NewRecurringExpense {
        description: description.to_string(),
        amount,
        category: category.to_string(),
        frequency,
        splits: equal_template_splits(amount, &participants),
        participants,
        group_id: None,
        split_type: SplitType::Equal,
    };

    let template = db.create_recurring(user.id, &new, Utc::now())?;
    db.log_audit(
        &user.email,
        "create",
        Some("recurring"),
        Some(template.id),
        Some(&format!("frequency={}", template.frequency)),
    )?;

    println!(
        "✅ Created {} template #{}: {} ${:.2}",
        template.frequency, template.id, template.description, template.amount
    );
    println!(
        "   First due: {}",
        template.next_due.format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

pub fn cmd_recurring_list(db: &Database, user: &User) -> Result<()> {
    let templates = db.list_recurring(user.id)?;

    if templates.is_empty() {
        println!("No recurring expenses. Add one with: splitr recurring add <description> <amount>");
        return Ok(());
    }

    println!("\n🔁 Recurring expenses ({})", templates.len());
    println!("{}", "─".repeat(70));

    let now = Utc::now();
    for template in &templates {
        let state = if !template.is_active {
            "⏸️  paused"
        } else if template.next_due <= now {
            "⏰ due"
        } else {
            "✓ active"
        };
        println!(
            "  #{:<5} {:<28} ${:>9.2}  {:<9} next {}  {}",
            template.id,
            truncate(&template.description, 28),
            template.amount,
            template.frequency.as_str(),
            template.next_due.format("%Y-%m-%d"),
            state
        );
    }

    println!();
    Ok(())
}

/// Flip a template between active and paused
pub fn cmd_recurring_toggle(db: &Database, user: &User, id: i64) -> Result<()> {
    let current = db
        .get_recurring(id)?
        .ok_or_else(|| anyhow!("Recurring expense #{} not found", id))?;

    let template = db.set_recurring_active(id, user.id, !current.is_active)?;
    db.log_audit(
        &user.email,
        "update",
        Some("recurring"),
        Some(id),
        Some(&format!("is_active={}", template.is_active)),
    )?;

    if template.is_active {
        println!("▶️  Resumed #{} {}", id, template.description);
    } else {
        println!("⏸️  Paused #{} {}", id, template.description);
    }
    Ok(())
}

/// Create one template's expense now
pub fn cmd_recurring_run(db: &Database, user: &User, id: i64) -> Result<()> {
    let outcome = db.materialize_recurring(id, user.id, Utc::now())?;
    db.log_audit(
        &user.email,
        "materialize",
        Some("recurring"),
        Some(id),
        Some(&format!("expense={}", outcome.expense.id)),
    )?;

    println!(
        "✅ Created expense #{} from template #{} (${:.2})",
        outcome.expense.id, id, outcome.expense.amount
    );
    println!(
        "   Next due: {}",
        outcome.template.next_due.format("%Y-%m-%d")
    );
    Ok(())
}

/// Materialize every due template for every user
pub fn cmd_recurring_due(db: &Database) -> Result<()> {
    let outcomes = db.materialize_due_recurring(Utc::now())?;

    if outcomes.is_empty() {
        println!("✅ Nothing due.");
        return Ok(());
    }

    for outcome in &outcomes {
        db.log_audit(
            "cli",
            "materialize",
            Some("recurring"),
            Some(outcome.template.id),
            Some(&format!("expense={}", outcome.expense.id)),
        )?;
        println!(
            "  🔁 #{} {} → expense #{} (next {})",
            outcome.template.id,
            outcome.template.description,
            outcome.expense.id,
            outcome.template.next_due.format("%Y-%m-%d")
        );
    }
    println!("✅ Created {} expense(s)", outcomes.len());
    Ok(())
}

pub fn cmd_recurring_delete(db: &Database, user: &User, id: i64) -> Result<()> {
    db.delete_recurring(id, user.id)?;
    db.log_audit(&user.email, "delete", Some("recurring"), Some(id), None)?;
    println!("🗑️  Deleted recurring expense #{}", id);
    Ok(())
}

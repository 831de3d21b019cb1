//! Budget commands (set, overview)

use anyhow::Result;
use chrono::Utc;
use splitr_core::db::Database;
use splitr_core::models::{BudgetStatus, User};

pub fn cmd_budgets_set(db: &Database, user: &User, category: &str, limit: f64) -> Result<()> {
    let budget = db.set_budget(user.id, category, limit, Utc::now())?;
    db.log_audit(
        &user.email,
        "update",
        Some("budget"),
        Some(budget.id),
        Some(&format!("category={}, limit={:.2}", budget.category, limit)),
    )?;

    println!(
        "✅ Budget for '{}' in {}-{:02}: ${:.2} (${:.2} spent so far)",
        budget.category, budget.year, budget.month, budget.monthly_limit, budget.spent
    );
    Ok(())
}

pub fn cmd_budgets_overview(db: &Database, user: &User) -> Result<()> {
    let overview = db.budget_overview(user.id, Utc::now())?;

    if overview.is_empty() {
        println!("No budgets or spending this month.");
        println!("Set one with: splitr budgets set <category> <limit>");
        return Ok(());
    }

    println!("\n🎯 Budgets this month");
    println!("{}", "─".repeat(70));

    for (category, entry) in &overview {
        let icon = match entry.status {
            BudgetStatus::Good => "🟢",
            BudgetStatus::Warning => "🟡",
            BudgetStatus::Danger => "🔴",
            BudgetStatus::NoBudget => "⚪",
        };
        if entry.status == BudgetStatus::NoBudget {
            println!(
                "  {} {:<16} ${:>9.2} spent, no budget",
                icon, category, entry.spent
            );
        } else {
            println!(
                "  {} {:<16} ${:>9.2} of ${:>9.2}  {:>5.1}%  (${:.2} left)",
                icon, category, entry.spent, entry.budget, entry.percentage, entry.remaining
            );
        }
    }

    println!();
    Ok(())
}

//! Suggestion commands

use anyhow::Result;
use chrono::Utc;
use splitr_core::db::Database;
use splitr_core::models::User;

use super::{participant_ids, truncate};

pub fn cmd_suggestions_generate(db: &Database, user: &User) -> Result<()> {
    let count = db.generate_suggestions(user.id, Utc::now())?;
    db.log_audit(
        &user.email,
        "generate",
        Some("suggestion"),
        None,
        Some(&format!("generated={}", count)),
    )?;

    println!(
        "🔍 Found {} spending pattern(s) in the last {} days",
        count,
        db.config().suggestion_window_days
    );
    if count > 0 {
        println!("   View them with: splitr suggestions list");
    }
    Ok(())
}

pub fn cmd_suggestions_list(db: &Database, user: &User) -> Result<()> {
    let suggestions = db.list_suggestions(user.id)?;

    if suggestions.is_empty() {
        println!("No suggestions. Generate them with: splitr suggestions generate");
        return Ok(());
    }

    println!("\n💡 Suggestions");
    println!("{}", "─".repeat(70));
    for suggestion in &suggestions {
        println!(
            "  #{:<5} {:<28} ~${:>8.2}  {:<9} {:>3.0}% confidence  [{}]",
            suggestion.id,
            truncate(&suggestion.description, 28),
            suggestion.avg_amount,
            suggestion.frequency.as_str(),
            suggestion.confidence * 100.0,
            suggestion.category.as_deref().unwrap_or("other")
        );
    }

    println!();
    Ok(())
}

pub fn cmd_suggestions_use(
    db: &Database,
    user: &User,
    id: i64,
    amount: Option<f64>,
    with: &[String],
) -> Result<()> {
    let participants = participant_ids(db, user, with)?;
    let expense = db.use_suggestion(id, user.id, amount, &participants, None, Utc::now())?;
    db.log_audit(
        &user.email,
        "use",
        Some("suggestion"),
        Some(id),
        Some(&format!("expense={}", expense.id)),
    )?;

    println!(
        "✅ Recorded expense #{}: {} ${:.2}",
        expense.id, expense.description, expense.amount
    );
    Ok(())
}

pub fn cmd_suggestions_dismiss(db: &Database, user: &User, id: i64) -> Result<()> {
    db.dismiss_suggestion(id, user.id)?;
    db.log_audit(&user.email, "dismiss", Some("suggestion"), Some(id), None)?;
    println!("🙈 Dismissed suggestion #{}", id);
    Ok(())
}

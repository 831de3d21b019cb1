//! Analytics commands (summary, trends)

use anyhow::{anyhow, Result};
use chrono::Utc;
use splitr_core::db::Database;
use splitr_core::models::{TimeRange, TrendGrouping, User};

fn trend_arrow(change: f64) -> &'static str {
    if change > 0.0 {
        "📈"
    } else if change < 0.0 {
        "📉"
    } else {
        "➖"
    }
}

/// Spending summary for a time range
pub fn cmd_analytics(
    db: &Database,
    user: &User,
    range: &str,
    refresh: bool,
    json: bool,
) -> Result<()> {
    let range: TimeRange = range.parse().map_err(|e: String| anyhow!(e))?;

    if refresh {
        db.clear_analytics_cache(user.id)?;
    }
    let analytics = db.expense_analytics(user.id, range, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    println!("\n📊 Spending this {}", range);
    println!("   ─────────────────────────────");
    println!(
        "   Total spent:   ${:.2}  {} {:+.1}%",
        analytics.total_spent,
        trend_arrow(analytics.spent_trend),
        analytics.spent_trend
    );
    println!(
        "   Average:       ${:.2}  {} {:+.1}%",
        analytics.avg_expense,
        trend_arrow(analytics.avg_trend),
        analytics.avg_trend
    );

    match &analytics.top_category {
        Some(top) => println!("   Top category:  {} (${:.2})", top.name, top.amount),
        None => println!("   Top category:  none"),
    }

    if !analytics.category_breakdown.is_empty() {
        println!();
        println!("   By category:");
        for category in &analytics.category_breakdown {
            println!(
                "     {:<16} ${:>9.2}  {:>5.1}%",
                category.name, category.amount, category.percentage
            );
        }
    }

    println!();
    Ok(())
}

/// Bucketed spending series
pub fn cmd_trends(db: &Database, user: &User, range: &str, group_by: &str) -> Result<()> {
    let range: TimeRange = range.parse().map_err(|e: String| anyhow!(e))?;
    let group_by: TrendGrouping = group_by.parse().map_err(|e: String| anyhow!(e))?;

    let points = db.spending_trends(user.id, range, group_by, Utc::now())?;

    if points.is_empty() {
        println!(
            "No trend series for range '{}' grouped by '{}'",
            range,
            group_by.as_str()
        );
        println!("Supported: week/day, month/week, year/month");
        return Ok(());
    }

    let max = points
        .iter()
        .map(|p| p.total_spent)
        .fold(0.0_f64, f64::max);

    println!("\n📈 Spending by {} ({})", group_by.as_str(), range);
    println!("{}", "─".repeat(60));
    for point in &points {
        let width = if max > 0.0 {
            ((point.total_spent / max) * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "  {:<12} ${:>9.2} ({:>3}) {}",
            point.period.format("%Y-%m-%d").to_string(),
            point.total_spent,
            point.expense_count,
            "█".repeat(width)
        );
    }

    println!();
    Ok(())
}

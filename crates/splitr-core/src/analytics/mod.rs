//! Spending analytics
//!
//! Pure computations over a user's expense history. Nothing in here touches
//! the database; the store loads expenses and hands them to these functions.
//!
//! - **Aggregator** - user's share totals, averages, category breakdown
//! - **Trends** - period-over-period percentage change, bucketed series
//! - **Period** - week/month/year windows
//! - **Budget** - monthly category spend vs limits
//! - **Recurrence** - next-due arithmetic and template materialization
//! - **Suggestions** - recurring-pattern mining

pub mod aggregate;
pub mod budget;
pub mod period;
pub mod recurrence;
pub mod suggestions;
pub mod trends;

pub use aggregate::{
    aggregate, category_breakdown, involves_user, user_share, SpendingSummary, CATEGORY_COLORS,
    DEFAULT_CATEGORY,
};
pub use budget::{evaluate as evaluate_budgets, status_for};
pub use period::{window, PeriodWindow};
pub use recurrence::{equal_template_splits, is_due, plan_materialization, MaterializationPlan};
pub use suggestions::{MinedSuggestion, SuggestionMiner};
pub use trends::{percent_change, spending_trends};

use crate::models::{Expense, ExpenseAnalytics, TopCategory};

/// Placeholder budget status carried in analytics responses
pub const BUDGET_STATUS_PLACEHOLDER: &str = "under";

/// Build the analytics result from the current and previous period expenses
pub fn build_analytics(current: &[Expense], previous: &[Expense], user_id: i64) -> ExpenseAnalytics {
    let now = aggregate(current, user_id);
    let before = aggregate(previous, user_id);

    let breakdown = category_breakdown(&now.by_category, now.total);
    let top_category = breakdown.first().map(|c| TopCategory {
        name: c.name.clone(),
        amount: c.amount,
    });

    ExpenseAnalytics {
        total_spent: now.total,
        avg_expense: now.average(),
        top_category,
        category_breakdown: breakdown,
        spent_trend: percent_change(now.total, before.total),
        avg_trend: percent_change(now.average(), before.average()),
        budget_status: BUDGET_STATUS_PLACEHOLDER.to_string(),
        budget_diff: 0.0,
    }
}

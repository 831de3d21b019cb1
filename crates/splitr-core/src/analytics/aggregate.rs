//! Expense Aggregator
//!
//! Sums a user's own share of a set of expenses and breaks the total down
//! by category.

use std::collections::BTreeMap;

use crate::models::{CategoryAmount, Expense, Split};

/// Category assigned to expenses recorded without one
pub const DEFAULT_CATEGORY: &str = "other";

/// Display colors for the category breakdown, assigned by rank
pub const CATEGORY_COLORS: [&str; 10] = [
    "#8B5CF6", "#10B981", "#F59E0B", "#EF4444", "#3B82F6", "#EC4899", "#84CC16", "#F97316",
    "#6366F1", "#14B8A6",
];

/// Totals for one user over one set of expenses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingSummary {
    /// Sum of the user's split amounts
    pub total: f64,
    /// Number of expenses the user is involved in
    pub count: usize,
    /// Per-category sums of the user's split amounts
    pub by_category: BTreeMap<String, f64>,
}

impl SpendingSummary {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

impl Expense {
    /// Category, or the default bucket when none was recorded
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// True when the user paid for the expense or owes a share of it
pub fn involves_user(expense: &Expense, user_id: i64) -> bool {
    expense.paid_by == user_id || expense.splits.iter().any(|s| s.user_id == user_id)
}

pub fn user_split(expense: &Expense, user_id: i64) -> Option<&Split> {
    expense.splits.iter().find(|s| s.user_id == user_id)
}

/// The user's owed amount for an expense, 0 if they have no split
pub fn user_share(expense: &Expense, user_id: i64) -> f64 {
    user_split(expense, user_id).map(|s| s.amount).unwrap_or(0.0)
}

/// Aggregate a user's spending over the expenses they are involved in.
///
/// Expenses that don't involve the user are skipped. An expense the user paid
/// for without holding a split counts toward `count` but adds nothing to the
/// totals.
pub fn aggregate<'a, I>(expenses: I, user_id: i64) -> SpendingSummary
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut summary = SpendingSummary::default();

    for expense in expenses {
        if !involves_user(expense, user_id) {
            continue;
        }
        summary.count += 1;

        if let Some(split) = user_split(expense, user_id) {
            summary.total += split.amount;
            *summary
                .by_category
                .entry(expense.category_or_default().to_string())
                .or_insert(0.0) += split.amount;
        }
    }

    summary
}

/// Rank category totals by amount, descending, with percentages of `total`
pub fn category_breakdown(totals: &BTreeMap<String, f64>, total: f64) -> Vec<CategoryAmount> {
    let mut sorted: Vec<(&String, &f64)> = totals.iter().collect();
    // Stable sort keeps name order for equal amounts
    sorted.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));

    sorted
        .into_iter()
        .enumerate()
        .map(|(rank, (name, &amount))| CategoryAmount {
            name: name.clone(),
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
            color: CATEGORY_COLORS[rank % CATEGORY_COLORS.len()].to_string(),
        })
        .collect()
}

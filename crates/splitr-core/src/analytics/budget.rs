//! Budget Evaluator
//!
//! Compares a month's per-category spend with the user's category limits.

use std::collections::BTreeMap;

use crate::models::{Budget, BudgetOverviewEntry, BudgetStatus};

/// Percentage at or above which a budget is in danger
pub const DANGER_THRESHOLD: f64 = 90.0;
/// Percentage at or above which a budget is flagged as a warning
pub const WARNING_THRESHOLD: f64 = 70.0;

pub fn status_for(percentage: f64) -> BudgetStatus {
    if percentage >= DANGER_THRESHOLD {
        BudgetStatus::Danger
    } else if percentage >= WARNING_THRESHOLD {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Good
    }
}

/// Evaluate budgets against spend, keyed and ordered by category.
///
/// Categories with positive spend but no budget are reported as `no-budget`.
pub fn evaluate(
    budgets: &[Budget],
    spending: &BTreeMap<String, f64>,
) -> BTreeMap<String, BudgetOverviewEntry> {
    let mut overview = BTreeMap::new();

    for budget in budgets {
        let spent = spending.get(&budget.category).copied().unwrap_or(0.0);
        let percentage = if budget.monthly_limit > 0.0 {
            spent / budget.monthly_limit * 100.0
        } else {
            0.0
        };

        overview.insert(
            budget.category.clone(),
            BudgetOverviewEntry {
                budget: budget.monthly_limit,
                spent,
                percentage,
                remaining: (budget.monthly_limit - spent).max(0.0),
                status: status_for(percentage),
            },
        );
    }

    for (category, &spent) in spending {
        if spent <= 0.0 {
            continue;
        }
        overview
            .entry(category.clone())
            .or_insert(BudgetOverviewEntry {
                budget: 0.0,
                spent,
                percentage: 0.0,
                remaining: 0.0,
                status: BudgetStatus::NoBudget,
            });
    }

    overview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn budget(category: &str, limit: f64) -> Budget {
        Budget {
            id: 1,
            user_id: 1,
            category: category.to_string(),
            monthly_limit: limit,
            year: 2024,
            month: 3,
            spent: 0.0,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(status_for(0.0), BudgetStatus::Good);
        assert_eq!(status_for(69.99), BudgetStatus::Good);
        assert_eq!(status_for(70.0), BudgetStatus::Warning);
        assert_eq!(status_for(89.9), BudgetStatus::Warning);
        assert_eq!(status_for(90.0), BudgetStatus::Danger);
        assert_eq!(status_for(140.0), BudgetStatus::Danger);
    }

    #[test]
    fn test_evaluate_budgeted_category() {
        let spending = BTreeMap::from([("food".to_string(), 75.0)]);
        let overview = evaluate(&[budget("food", 100.0)], &spending);

        let food = &overview["food"];
        assert_eq!(food.status, BudgetStatus::Warning);
        assert!((food.percentage - 75.0).abs() < 1e-9);
        assert!((food.remaining - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_overspent_has_zero_remaining() {
        let spending = BTreeMap::from([("food".to_string(), 150.0)]);
        let overview = evaluate(&[budget("food", 100.0)], &spending);

        assert_eq!(overview["food"].remaining, 0.0);
        assert_eq!(overview["food"].status, BudgetStatus::Danger);
    }

    #[test]
    fn test_unbudgeted_spend_is_no_budget() {
        let spending = BTreeMap::from([("travel".to_string(), 40.0)]);
        let overview = evaluate(&[budget("food", 100.0)], &spending);

        assert_eq!(overview.len(), 2);
        let travel = &overview["travel"];
        assert_eq!(travel.status, BudgetStatus::NoBudget);
        assert_eq!(travel.budget, 0.0);
        assert_eq!(travel.spent, 40.0);

        // Budget with no spend is still reported
        assert_eq!(overview["food"].spent, 0.0);
        assert_eq!(overview["food"].status, BudgetStatus::Good);
    }

    #[test]
    fn test_zero_spend_without_budget_is_omitted() {
        let spending = BTreeMap::from([
            ("gifts".to_string(), 0.0),
            ("travel".to_string(), 12.0),
        ]);
        let overview = evaluate(&[], &spending);

        assert!(!overview.contains_key("gifts"));
        assert_eq!(overview["travel"].status, BudgetStatus::NoBudget);
    }

    #[test]
    fn test_zero_limit_gives_zero_percentage() {
        let spending = BTreeMap::from([("food".to_string(), 10.0)]);
        let overview = evaluate(&[budget("food", 0.0)], &spending);
        assert_eq!(overview["food"].percentage, 0.0);
        assert_eq!(overview["food"].status, BudgetStatus::Good);
    }
}

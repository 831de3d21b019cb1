//! Suggestion Miner
//!
//! Finds repeating expenses in a user's recent history and turns each
//! repeating pattern into a ranked suggestion.
//!
//! Expenses are grouped by category plus lower-cased, trimmed description.
//! A group needs at least two occurrences. The mean gap between occurrences
//! gives the frequency class, and the consistency of the amounts gives the
//! confidence score.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{Expense, SuggestionFrequency};

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Minimum occurrences for a group to count as a pattern
pub const MIN_OCCURRENCES: usize = 2;

/// A mined pattern, ready to be stored as a suggestion
#[derive(Debug, Clone, PartialEq)]
pub struct MinedSuggestion {
    pub description: String,
    pub category: Option<String>,
    pub avg_amount: f64,
    pub frequency: SuggestionFrequency,
    pub confidence: f64,
    pub based_on_expenses: Vec<i64>,
}

/// Grouping key: category and normalized description
pub fn pattern_key(expense: &Expense) -> (Option<String>, String) {
    (
        expense.category.clone(),
        expense.description.trim().to_lowercase(),
    )
}

/// Classify the mean gap between occurrences, in days
pub fn classify_interval(mean_gap_days: f64) -> SuggestionFrequency {
    if mean_gap_days <= 2.0 {
        SuggestionFrequency::Daily
    } else if mean_gap_days <= 8.0 {
        SuggestionFrequency::Weekly
    } else if mean_gap_days <= 35.0 {
        SuggestionFrequency::Monthly
    } else {
        SuggestionFrequency::Irregular
    }
}

/// `1 - stddev/mean` of the amounts, clamped to [0, 1].
///
/// Uses the population standard deviation. Returns 0 when the mean is not
/// positive.
pub fn confidence(amounts: &[f64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let n = amounts.len() as f64;
    let mean = amounts.iter().sum::<f64>() / n;
    if mean <= 0.0 || !mean.is_finite() {
        return 0.0;
    }
    let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}

fn mean_gap_days(dates: &[DateTime<Utc>]) -> f64 {
    if dates.len() < 2 {
        return 0.0;
    }
    let gaps: i64 = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_milliseconds())
        .sum();
    gaps as f64 / (dates.len() - 1) as f64 / MS_PER_DAY
}

#[derive(Default)]
struct Pattern<'a> {
    expenses: Vec<&'a Expense>,
}

pub struct SuggestionMiner {
    max_suggestions: usize,
}

impl SuggestionMiner {
    pub fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Mine patterns from expenses paid by `user_id`, best first.
    ///
    /// The caller is responsible for restricting `expenses` to the trailing
    /// window.
    pub fn mine(&self, expenses: &[Expense], user_id: i64) -> Vec<MinedSuggestion> {
        let mut paid: Vec<&Expense> = expenses.iter().filter(|e| e.paid_by == user_id).collect();
        paid.sort_by_key(|e| (e.date, e.id));

        let mut patterns: BTreeMap<(Option<String>, String), Pattern> = BTreeMap::new();
        for expense in paid {
            patterns
                .entry(pattern_key(expense))
                .or_default()
                .expenses
                .push(expense);
        }

        let mut mined: Vec<MinedSuggestion> = patterns
            .into_values()
            .filter(|p| p.expenses.len() >= MIN_OCCURRENCES)
            .map(|p| {
                let amounts: Vec<f64> = p.expenses.iter().map(|e| e.amount).collect();
                let dates: Vec<DateTime<Utc>> = p.expenses.iter().map(|e| e.date).collect();
                let first = p.expenses[0];

                MinedSuggestion {
                    description: first.description.clone(),
                    category: first.category.clone(),
                    avg_amount: amounts.iter().sum::<f64>() / amounts.len() as f64,
                    frequency: classify_interval(mean_gap_days(&dates)),
                    confidence: confidence(&amounts),
                    based_on_expenses: p.expenses.iter().map(|e| e.id).collect(),
                }
            })
            .collect();

        mined.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        mined.truncate(self.max_suggestions);

        tracing::debug!(user_id, count = mined.len(), "Mined suggestion patterns");
        mined
    }
}

impl Default for SuggestionMiner {
    fn default() -> Self {
        Self::new(10)
    }
}

//! Recurrence Scheduler
//!
//! Next-due arithmetic and the pure half of materializing a recurring
//! template into a concrete expense. The store applies the plan inside a
//! single transaction (see `Database::materialize_recurring`).

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::{Error, Result};
use crate::models::{
    Frequency, NewExpense, NewRecurringExpense, RecurringExpense, Split, TemplateSplit,
    SPLIT_TOLERANCE,
};

impl Frequency {
    /// Next occurrence after `from`.
    ///
    /// Monthly and yearly steps keep the day of month, clamping to the last
    /// valid day (Jan 31 → Feb 29 in a leap year).
    pub fn advance(&self, from: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let next = match self {
            Self::Weekly => from.checked_add_signed(Duration::days(7)),
            Self::Biweekly => from.checked_add_signed(Duration::days(14)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
            Self::Yearly => from.checked_add_months(Months::new(12)),
        };
        next.ok_or_else(|| {
            Error::InvalidData(format!("Cannot advance {} from {}", self.as_str(), from))
        })
    }
}

impl NewRecurringExpense {
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(Error::InvalidData("Description is required".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Amount must be a positive number, got {}",
                self.amount
            )));
        }
        if self.splits.is_empty() {
            return Err(Error::InvalidData("At least one split is required".into()));
        }
        if self
            .splits
            .iter()
            .any(|s| !s.amount.is_finite() || s.amount < 0.0)
        {
            return Err(Error::InvalidData(
                "Split amounts must be non-negative numbers".into(),
            ));
        }
        let split_total: f64 = self.splits.iter().map(|s| s.amount).sum();
        if (split_total - self.amount).abs() > SPLIT_TOLERANCE {
            return Err(Error::InvalidData(format!(
                "Splits sum to {:.2} but template amount is {:.2}",
                split_total, self.amount
            )));
        }
        Ok(())
    }
}

/// Equal template shares of `amount` across `participants`
pub fn equal_template_splits(amount: f64, participants: &[i64]) -> Vec<TemplateSplit> {
    if participants.is_empty() {
        return Vec::new();
    }
    let share = amount / participants.len() as f64;
    participants
        .iter()
        .map(|&user_id| TemplateSplit {
            user_id,
            amount: share,
            percentage: None,
        })
        .collect()
}

/// An active template whose due date has passed
pub fn is_due(template: &RecurringExpense, now: DateTime<Utc>) -> bool {
    template.is_active && template.next_due <= now
}

/// Template splits as expense splits; the acting user's share is pre-paid
pub fn materialized_splits(template: &RecurringExpense, acting_user: i64) -> Vec<Split> {
    template
        .splits
        .iter()
        .map(|s| Split {
            user_id: s.user_id,
            amount: s.amount,
            paid: s.user_id == acting_user,
        })
        .collect()
}

/// What materializing a template at `now` will write
#[derive(Debug, Clone)]
pub struct MaterializationPlan {
    pub expense: NewExpense,
    pub next_due: DateTime<Utc>,
    pub last_created: DateTime<Utc>,
}

/// Plan a materialization, checking ownership and the active flag.
///
/// The next due date is computed from `now`, not from the template's
/// previous due date, so a late run shifts the schedule.
pub fn plan_materialization(
    template: &RecurringExpense,
    acting_user: i64,
    now: DateTime<Utc>,
) -> Result<MaterializationPlan> {
    if template.user_id != acting_user {
        return Err(Error::Unauthorized(format!(
            "Recurring expense {} belongs to another user",
            template.id
        )));
    }
    if !template.is_active {
        return Err(Error::Inactive(format!(
            "Recurring expense {} is not active",
            template.id
        )));
    }

    let expense = NewExpense {
        description: template.description.clone(),
        amount: template.amount,
        category: Some(template.category.clone()),
        date: now,
        paid_by: acting_user,
        split_type: template.split_type,
        splits: materialized_splits(template, acting_user),
        group_id: template.group_id,
        recurring_id: Some(template.id),
    };

    Ok(MaterializationPlan {
        expense,
        next_due: template.frequency.advance(now)?,
        last_created: now,
    })
}

//! Domain models for Splitr

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerance when checking that split amounts add up to the expense total
pub const SPLIT_TOLERANCE: f64 = 0.01;

/// A user known to the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// How an expense is divided between participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    #[default]
    Equal,
    Percentage,
    Exact,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Exact => "exact",
        }
    }
}

impl std::str::FromStr for SplitType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "exact" => Ok(Self::Exact),
            _ => Err(format!("Unknown split type: {}", s)),
        }
    }
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user's owed share of an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub user_id: i64,
    pub amount: f64,
    pub paid: bool,
}

/// Fields extracted from a scanned receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub extracted_amount: Option<f64>,
}

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub paid_by: i64,
    pub created_by: i64,
    pub split_type: SplitType,
    pub splits: Vec<Split>,
    pub group_id: Option<i64>,
    pub receipt_image_url: Option<String>,
    pub receipt_data: Option<ReceiptData>,
    /// Template this expense was materialized from
    pub recurring_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// New expense for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub paid_by: i64,
    pub split_type: SplitType,
    pub splits: Vec<Split>,
    pub group_id: Option<i64>,
    pub recurring_id: Option<i64>,
}

impl NewExpense {
    /// Build an equal split among participants, with the payer's share marked paid
    pub fn equal_split(
        description: &str,
        amount: f64,
        category: Option<String>,
        date: DateTime<Utc>,
        paid_by: i64,
        participants: &[i64],
    ) -> Result<Self> {
        if participants.is_empty() {
            return Err(Error::InvalidData(
                "At least one participant is required".into(),
            ));
        }

        let share = amount / participants.len() as f64;
        let splits = participants
            .iter()
            .map(|&user_id| Split {
                user_id,
                amount: share,
                paid: user_id == paid_by,
            })
            .collect();

        Ok(Self {
            description: description.to_string(),
            amount,
            category,
            date,
            paid_by,
            split_type: SplitType::Equal,
            splits,
            group_id: None,
            recurring_id: None,
        })
    }

    /// Check the expense before it is stored
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
                "Splits sum to {:.2} but expense amount is {:.2}",
                split_total, self.amount
            )));
        }

        Ok(())
    }
}

/// Role of a group member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl std::str::FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(format!("Unknown group role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: i64,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// A group of users sharing expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
}

/// Monthly spending limit for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub monthly_limit: f64,
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
    /// Running total, adjusted as expenses are recorded
    pub spent: f64,
    pub last_updated: DateTime<Utc>,
}

/// Recurring expense cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split entry stored on a recurring template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSplit {
    pub user_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// A template that materializes into a concrete expense on a schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub frequency: Frequency,
    pub participants: Vec<i64>,
    pub group_id: Option<i64>,
    pub split_type: SplitType,
    pub splits: Vec<TemplateSplit>,
    pub next_due: DateTime<Utc>,
    pub last_created: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// New recurring template for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecurringExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub frequency: Frequency,
    pub participants: Vec<i64>,
    pub group_id: Option<i64>,
    #[serde(default)]
    pub split_type: SplitType,
    pub splits: Vec<TemplateSplit>,
}

/// Frequency class derived from the mean gap between occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionFrequency {
    Daily,
    Weekly,
    Monthly,
    Irregular,
}

impl SuggestionFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Irregular => "irregular",
        }
    }
}

impl std::str::FromStr for SuggestionFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "irregular" => Ok(Self::Irregular),
            _ => Err(format!("Unknown suggestion frequency: {}", s)),
        }
    }
}

/// Stored suggestion derived from a user's repeating expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub category: Option<String>,
    pub avg_amount: f64,
    pub frequency: SuggestionFrequency,
    /// Ranking score in [0, 1]
    pub confidence: f64,
    pub based_on_expenses: Vec<i64>,
    pub last_suggested: DateTime<Utc>,
    pub is_active: bool,
}

/// Analytics time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(format!("Unknown time range: {} (use week, month, year)", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bucket size for spending trend series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendGrouping {
    Day,
    Week,
    Month,
}

impl TrendGrouping {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::str::FromStr for TrendGrouping {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!("Unknown grouping: {} (use day, week, month)", s)),
        }
    }
}

/// One category's share of spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub name: String,
    pub amount: f64,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub name: String,
    pub amount: f64,
}

/// Spending analytics for one time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalytics {
    pub total_spent: f64,
    pub avg_expense: f64,
    pub top_category: Option<TopCategory>,
    pub category_breakdown: Vec<CategoryAmount>,
    /// Percentage change of total spent vs the previous period
    pub spent_trend: f64,
    /// Percentage change of the average expense vs the previous period
    pub avg_trend: f64,
    pub budget_status: String,
    pub budget_diff: f64,
}

/// One bucket of a spending trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: DateTime<Utc>,
    pub total_spent: f64,
    pub expense_count: usize,
}

/// Status tier of a category budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    Good,
    Warning,
    Danger,
    NoBudget,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::NoBudget => "no-budget",
        }
    }
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget evaluation for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetOverviewEntry {
    pub budget: f64,
    pub spent: f64,
    pub percentage: f64,
    pub remaining: f64,
    pub status: BudgetStatus,
}

/// Summary of scanned receipts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptAnalysis {
    pub total_receipts_scanned: usize,
    pub average_confidence: f64,
    pub top_merchants: BTreeMap<String, usize>,
}

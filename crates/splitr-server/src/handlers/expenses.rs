//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{current_user, AppError, AppState, MAX_PAGE_LIMIT};
use splitr_core::db::ExpenseFilter;
use splitr_core::models::{Expense, NewExpense, Split, SplitType};

/// One participant's share in a create request
#[derive(Debug, Deserialize)]
pub struct SplitInput {
    pub email: String,
    /// Exact amount owed (exact splits)
    pub amount: Option<f64>,
    /// Share of the total in percent (percentage splits)
    pub percentage: Option<f64>,
}

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    /// Payer email, defaults to the acting user
    pub paid_by: Option<String>,
    #[serde(default)]
    pub split_type: SplitType,
    /// Participants for an equal split (the acting user when empty)
    #[serde(default)]
    pub participants: Vec<String>,
    /// Shares for exact and percentage splits
    #[serde(default)]
    pub splits: Vec<SplitInput>,
    pub group_id: Option<i64>,
}

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_by_me: bool,
    #[serde(default = "default_expense_limit")]
    pub limit: i64,
}

fn default_expense_limit() -> i64 {
    100
}

/// POST /api/expenses - Record a new expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 64)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: CreateExpenseRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    if let Some(group_id) = req.group_id {
        if !state.db.is_group_member(group_id, user.id)? {
            return Err(AppError::forbidden("Not a member of this group"));
        }
    }

    let paid_by = match &req.paid_by {
        Some(email) => state.db.get_or_create_user(email)?.id,
        None => user.id,
    };
    let date = req.date.unwrap_or_else(Utc::now);

    let mut expense = match req.split_type {
        SplitType::Equal => {
            let participants = if req.participants.is_empty() {
                vec![user.id]
            } else {
                state.db.resolve_user_ids(&req.participants)?
            };
            NewExpense::equal_split(
                &req.description,
                req.amount,
                req.category.clone(),
                date,
                paid_by,
                &participants,
            )?
        }
        SplitType::Exact | SplitType::Percentage => {
            let mut splits = Vec::with_capacity(req.splits.len());
            for input in &req.splits {
                let share = match req.split_type {
                    SplitType::Exact => input.amount,
                    _ => input.percentage.map(|p| req.amount * p / 100.0),
                }
                .ok_or_else(|| {
                    AppError::bad_request(&format!("Missing share for {}", input.email))
                })?;
                let user_id = state.db.get_or_create_user(&input.email)?.id;
                splits.push(Split {
                    user_id,
                    amount: share,
                    paid: user_id == paid_by,
                });
            }
            NewExpense {
                description: req.description.clone(),
                amount: req.amount,
                category: req.category.clone(),
                date,
                paid_by,
                split_type: req.split_type,
                splits,
                group_id: None,
                recurring_id: None,
            }
        }
    };
    expense.group_id = req.group_id;

    let created = state.db.create_expense(&expense, user.id)?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("expense"),
        Some(created.id),
        Some(&format!(
            "amount={:.2}, split={}, participants={}",
            created.amount,
            created.split_type,
            created.splits.len()
        )),
    )?;

    Ok(Json(created))
}

/// GET /api/expenses - List expenses involving the acting user
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListExpensesQuery>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = current_user(&state, request.headers())?;
    let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);

    let filter = ExpenseFilter {
        from: query.from,
        until: query.until,
        paid_by_only: query.paid_by_me,
        limit: Some(limit),
    };
    let expenses = state.db.list_expenses_for_user(user.id, &filter)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("expense"),
        None,
        Some(&format!("count={}", expenses.len())),
    )?;

    Ok(Json(expenses))
}

/// GET /api/expenses/:id - Get a single expense the user is part of
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let expense = state
        .db
        .get_expense(id)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    let involved = expense.paid_by == user.id
        || expense.created_by == user.id
        || expense.splits.iter().any(|s| s.user_id == user.id);
    if !involved {
        return Err(AppError::not_found("Expense not found"));
    }

    state
        .db
        .log_audit(&user.email, "view", Some("expense"), Some(id), None)?;

    Ok(Json(expense))
}

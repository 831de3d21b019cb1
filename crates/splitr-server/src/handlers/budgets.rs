//! Budget handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::{current_user, AppError, AppState};
use splitr_core::models::{Budget, BudgetOverviewEntry};

/// Request body for setting a budget
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub category: String,
    pub monthly_limit: f64,
}

/// Query parameters selecting a calendar month (defaults to the current one)
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// PUT /api/budgets - Set this month's limit for a category
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Budget>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: SetBudgetRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let budget = state
        .db
        .set_budget(user.id, &req.category, req.monthly_limit, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "update",
        Some("budget"),
        Some(budget.id),
        Some(&format!(
            "category={}, limit={:.2}",
            budget.category, budget.monthly_limit
        )),
    )?;

    Ok(Json(budget))
}

/// GET /api/budgets - Budgets for a month
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
    request: Request,
) -> Result<Json<Vec<Budget>>, AppError> {
    let user = current_user(&state, request.headers())?;
    let now = Utc::now();
    let year = query.year.unwrap_or(now.year());
    let month = query.month.unwrap_or(now.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("month must be between 1 and 12"));
    }

    let budgets = state.db.list_budgets(user.id, year, month)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("budget"),
        None,
        Some(&format!("{}-{:02}, count={}", year, month, budgets.len())),
    )?;

    Ok(Json(budgets))
}

/// GET /api/budgets/spending - This month's share of spending per category
pub async fn get_budget_spending(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BTreeMap<String, f64>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let spending = state
        .db
        .monthly_spending_by_category(user.id, Utc::now())?;

    state
        .db
        .log_audit(&user.email, "view", Some("budget_spending"), None, None)?;

    Ok(Json(spending))
}

/// GET /api/budgets/overview - Budgets evaluated against this month's spending
pub async fn get_budget_overview(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BTreeMap<String, BudgetOverviewEntry>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let overview = state.db.budget_overview(user.id, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "view",
        Some("budget_overview"),
        None,
        Some(&format!("categories={}", overview.len())),
    )?;

    Ok(Json(overview))
}

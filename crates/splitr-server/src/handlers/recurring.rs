//! Recurring expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{current_user, AppError, AppState, SuccessResponse};
use splitr_core::analytics::equal_template_splits;
use splitr_core::db::MaterializeOutcome;
use splitr_core::models::{
    Frequency, NewRecurringExpense, RecurringExpense, SplitType, TemplateSplit,
};

/// Template share in a create request
#[derive(Debug, Deserialize)]
pub struct TemplateSplitInput {
    pub email: String,
    #[serde(default)]
    pub amount: f64,
    pub percentage: Option<f64>,
}

/// Request body for creating a recurring expense
#[derive(Debug, Deserialize)]
pub struct CreateRecurringRequest {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub frequency: String,
    /// Participant emails (the acting user when empty)
    #[serde(default)]
    pub participants: Vec<String>,
    pub group_id: Option<i64>,
    #[serde(default)]
    pub split_type: SplitType,
    #[serde(default)]
    pub splits: Vec<TemplateSplitInput>,
}

/// Optional body for toggling a template
#[derive(Debug, Default, Deserialize)]
pub struct ToggleRequest {
    pub is_active: Option<bool>,
}

/// POST /api/recurring - Create a recurring expense template
pub async fn create_recurring(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<RecurringExpense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 10)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: CreateRecurringRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let frequency: Frequency = req.frequency.parse().map_err(|_| {
        AppError::bad_request("Invalid frequency. Valid: weekly, biweekly, monthly, yearly")
    })?;

    let participants = if req.participants.is_empty() {
        vec![user.id]
    } else {
        state.db.resolve_user_ids(&req.participants)?
    };

    let splits = if req.splits.is_empty() && req.split_type == SplitType::Equal {
        equal_template_splits(req.amount, &participants)
    } else {
        let mut splits = Vec::with_capacity(req.splits.len());
        for input in &req.splits {
            let amount = match (req.split_type, input.percentage) {
                (SplitType::Percentage, Some(p)) => req.amount * p / 100.0,
                _ => input.amount,
            };
            splits.push(TemplateSplit {
                user_id: state.db.get_or_create_user(&input.email)?.id,
                amount,
                percentage: input.percentage,
            });
        }
        splits
    };

    let new = NewRecurringExpense {
        description: req.description,
        amount: req.amount,
        category: req.category,
        frequency,
        participants,
        group_id: req.group_id,
        split_type: req.split_type,
        splits,
    };

    let template = state.db.create_recurring(user.id, &new, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("recurring"),
        Some(template.id),
        Some(&format!(
            "amount={:.2}, frequency={}",
            template.amount, template.frequency
        )),
    )?;

    Ok(Json(template))
}

/// GET /api/recurring - The acting user's templates, soonest due first
pub async fn list_recurring(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<RecurringExpense>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let templates = state.db.list_recurring(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("recurring"),
        None,
        Some(&format!("count={}", templates.len())),
    )?;

    Ok(Json(templates))
}

/// GET /api/recurring/due - The acting user's active templates that are due now
pub async fn list_due_recurring(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<RecurringExpense>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let due: Vec<RecurringExpense> = state
        .db
        .list_due_recurring(Utc::now())?
        .into_iter()
        .filter(|t| t.user_id == user.id)
        .collect();

    state.db.log_audit(
        &user.email,
        "list",
        Some("recurring_due"),
        None,
        Some(&format!("count={}", due.len())),
    )?;

    Ok(Json(due))
}

/// POST /api/recurring/:id/toggle - Pause or resume a template
///
/// Flips the current state unless the body names one explicitly.
pub async fn toggle_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<RecurringExpense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: ToggleRequest = if bytes.is_empty() {
        ToggleRequest::default()
    } else {
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?
    };

    let current = state
        .db
        .get_recurring(id)?
        .ok_or_else(|| AppError::not_found("Recurring expense not found"))?;
    let is_active = req.is_active.unwrap_or(!current.is_active);

    let template = state.db.set_recurring_active(id, user.id, is_active)?;

    state.db.log_audit(
        &user.email,
        "update",
        Some("recurring"),
        Some(id),
        Some(&format!("is_active={}", is_active)),
    )?;

    Ok(Json(template))
}

/// POST /api/recurring/:id/materialize - Create the expense for a template now
pub async fn materialize_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<MaterializeOutcome>, AppError> {
    let user = current_user(&state, request.headers())?;

    let outcome = state.db.materialize_recurring(id, user.id, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "materialize",
        Some("recurring"),
        Some(id),
        Some(&format!(
            "expense={}, next_due={}",
            outcome.expense.id,
            outcome.template.next_due.to_rfc3339()
        )),
    )?;

    Ok(Json(outcome))
}

/// DELETE /api/recurring/:id - Delete a template
pub async fn delete_recurring(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user = current_user(&state, request.headers())?;

    state.db.delete_recurring(id, user.id)?;

    state
        .db
        .log_audit(&user.email, "delete", Some("recurring"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

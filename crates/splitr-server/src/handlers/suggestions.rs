//! Expense suggestion handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{current_user, AppError, AppState, SuccessResponse};
use splitr_core::models::{Expense, Suggestion};

/// Response for suggestion regeneration
#[derive(Serialize)]
pub struct GenerateSuggestionsResponse {
    pub generated: usize,
}

/// Request body for turning a suggestion into an expense
#[derive(Debug, Default, Deserialize)]
pub struct UseSuggestionRequest {
    /// Overrides the suggested average amount
    pub amount: Option<f64>,
    /// Participant emails (the acting user when empty)
    #[serde(default)]
    pub participants: Vec<String>,
    pub group_id: Option<i64>,
}

/// POST /api/suggestions/generate - Re-mine the acting user's history
pub async fn generate_suggestions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<GenerateSuggestionsResponse>, AppError> {
    let user = current_user(&state, request.headers())?;

    let generated = state.db.generate_suggestions(user.id, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "generate",
        Some("suggestion"),
        None,
        Some(&format!("generated={}", generated)),
    )?;

    Ok(Json(GenerateSuggestionsResponse { generated }))
}

/// GET /api/suggestions - Active suggestions, most confident first
pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Suggestion>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let suggestions = state.db.list_suggestions(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("suggestion"),
        None,
        Some(&format!("count={}", suggestions.len())),
    )?;

    Ok(Json(suggestions))
}

/// POST /api/suggestions/:id/use - Create an expense from a suggestion
pub async fn use_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 10)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: UseSuggestionRequest = if bytes.is_empty() {
        UseSuggestionRequest::default()
    } else {
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?
    };

    let participants = if req.participants.is_empty() {
        vec![user.id]
    } else {
        state.db.resolve_user_ids(&req.participants)?
    };

    let expense = state.db.use_suggestion(
        id,
        user.id,
        req.amount,
        &participants,
        req.group_id,
        Utc::now(),
    )?;

    state.db.log_audit(
        &user.email,
        "use",
        Some("suggestion"),
        Some(id),
        Some(&format!("expense={}", expense.id)),
    )?;

    Ok(Json(expense))
}

/// POST /api/suggestions/:id/dismiss - Hide a suggestion
pub async fn dismiss_suggestion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user = current_user(&state, request.headers())?;

    state.db.dismiss_suggestion(id, user.id)?;

    state
        .db
        .log_audit(&user.email, "dismiss", Some("suggestion"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}

//! Expense group handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{current_user, AppError, AppState};
use splitr_core::models::Group;

/// Request body for creating a group
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    /// Member emails; the creator is always added as admin
    #[serde(default)]
    pub members: Vec<String>,
}

/// POST /api/groups - Create a group
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Group>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 10)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: CreateGroupRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("Group name is required"));
    }

    let member_ids = state.db.resolve_user_ids(&req.members)?;
    let group = state.db.create_group(
        req.name.trim(),
        req.description.as_deref(),
        user.id,
        &member_ids,
    )?;

    state.db.log_audit(
        &user.email,
        "create",
        Some("group"),
        Some(group.id),
        Some(&format!("members={}", group.members.len())),
    )?;

    Ok(Json(group))
}

/// GET /api/groups - Groups the acting user belongs to
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Group>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let groups = state.db.list_groups_for_user(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("group"),
        None,
        Some(&format!("count={}", groups.len())),
    )?;

    Ok(Json(groups))
}

/// GET /api/groups/:id - Get a group the acting user belongs to
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Group>, AppError> {
    let user = current_user(&state, request.headers())?;

    let group = state
        .db
        .get_group(id)?
        .ok_or_else(|| AppError::not_found("Group not found"))?;

    if !group.members.iter().any(|m| m.user_id == user.id) {
        return Err(AppError::not_found("Group not found"));
    }

    state
        .db
        .log_audit(&user.email, "view", Some("group"), Some(id), None)?;

    Ok(Json(group))
}

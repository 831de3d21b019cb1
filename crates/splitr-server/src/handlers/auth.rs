//! Identity handlers

use std::sync::Arc;

use axum::extract::Request;
use axum::{extract::State, Json};
use serde::Serialize;

use crate::{current_user, AppError, AppState, DEFAULT_USER_EMAIL};
use splitr_core::models::User;

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    /// How the identity was established
    pub identity_source: String,
}

/// Get the acting user, registering them on first request
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MeResponse>, AppError> {
    let user = current_user(&state, request.headers())?;

    let identity_source = if user.email == DEFAULT_USER_EMAIL {
        "none"
    } else {
        "header"
    };

    Ok(Json(MeResponse {
        user,
        identity_source: identity_source.to_string(),
    }))
}

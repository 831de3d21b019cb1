//! Receipt handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use base64::Engine;
use serde::Deserialize;

use crate::{current_user, AppError, AppState, MAX_UPLOAD_SIZE};
use splitr_core::models::{Expense, ReceiptAnalysis, ReceiptData};
use splitr_core::receipts::scan_receipt;
use splitr_core::ReceiptScan;

/// Request body for receipt parsing
#[derive(Debug, Deserialize)]
pub struct ParseReceiptRequest {
    /// Base64-encoded image bytes
    pub image: String,
    pub filename: String,
}

/// Request body for attaching a receipt to an expense
#[derive(Debug, Deserialize)]
pub struct AttachReceiptRequest {
    pub image_url: String,
    #[serde(default)]
    pub receipt_data: ReceiptData,
}

/// POST /api/receipts/parse - Run OCR and derive a suggested expense
pub async fn parse_receipt(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ReceiptScan>, AppError> {
    let user = current_user(&state, request.headers())?;

    // Base64 inflates by 4/3
    let bytes = axum::body::to_bytes(request.into_body(), MAX_UPLOAD_SIZE / 3 * 4 + 4096)
        .await
        .map_err(|_| AppError::bad_request("Request body too large"))?;
    let req: ParseReceiptRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let image = base64::engine::general_purpose::STANDARD
        .decode(req.image.trim())
        .map_err(|e| AppError::bad_request(&format!("Invalid base64 data: {}", e)))?;

    if image.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::bad_request(&format!(
            "Image too large. Maximum size is {} MB",
            MAX_UPLOAD_SIZE / 1024 / 1024
        )));
    }

    let scan = scan_receipt(state.receipt_parser.as_ref(), &image, &req.filename).await?;

    state.db.log_audit(
        &user.email,
        "parse",
        Some("receipt"),
        None,
        Some(&format!(
            "parser={}, bytes={}, hash={}",
            state.receipt_parser.name(),
            image.len(),
            scan.content_hash
        )),
    )?;

    Ok(Json(scan))
}

/// POST /api/expenses/:id/receipt - Attach a parsed receipt to an expense
pub async fn attach_receipt(
    State(state): State<Arc<AppState>>,
    Path(expense_id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user = current_user(&state, request.headers())?;

    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 64)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body"))?;
    let req: AttachReceiptRequest =
        serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Invalid JSON"))?;

    let expense =
        state
            .db
            .attach_receipt(expense_id, user.id, &req.image_url, &req.receipt_data)?;

    state.db.log_audit(
        &user.email,
        "attach",
        Some("receipt"),
        Some(expense_id),
        req.receipt_data.merchant_name.as_deref(),
    )?;

    Ok(Json(expense))
}

/// GET /api/receipts - Expenses with receipts the user paid for or created
pub async fn list_receipts(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user = current_user(&state, request.headers())?;

    let expenses = state.db.list_expenses_with_receipts(user.id)?;

    state.db.log_audit(
        &user.email,
        "list",
        Some("receipt"),
        None,
        Some(&format!("count={}", expenses.len())),
    )?;

    Ok(Json(expenses))
}

/// GET /api/receipts/analysis - Receipt scan statistics
pub async fn get_receipt_analysis(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ReceiptAnalysis>, AppError> {
    let user = current_user(&state, request.headers())?;

    let analysis = state.db.receipt_analysis(user.id)?;

    state.db.log_audit(
        &user.email,
        "view",
        Some("receipt_analysis"),
        None,
        Some(&format!("scanned={}", analysis.total_receipts_scanned)),
    )?;

    Ok(Json(analysis))
}

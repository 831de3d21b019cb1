//! Spending analytics handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{current_user, AppError, AppState};
use splitr_core::models::{ExpenseAnalytics, TimeRange, TrendGrouping, TrendPoint};

/// Query parameters for analytics
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default = "default_time_range")]
    pub time_range: String,
}

/// Query parameters for trend series
#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default = "default_time_range")]
    pub time_range: String,
    #[serde(default = "default_group_by")]
    pub group_by: String,
}

fn default_time_range() -> String {
    "month".to_string()
}

fn default_group_by() -> String {
    "week".to_string()
}

/// Response for cache invalidation
#[derive(Serialize)]
pub struct ClearCacheResponse {
    pub removed: usize,
}

fn parse_time_range(value: &str) -> Result<TimeRange, AppError> {
    value
        .parse()
        .map_err(|_| AppError::bad_request("Invalid time_range. Valid: week, month, year"))
}

/// GET /api/analytics - Spending summary with period-over-period trends
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
    request: Request,
) -> Result<Json<ExpenseAnalytics>, AppError> {
    let user = current_user(&state, request.headers())?;
    let range = parse_time_range(&query.time_range)?;

    let analytics = state.db.expense_analytics(user.id, range, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "view",
        Some("analytics"),
        None,
        Some(&format!("range={}", range)),
    )?;

    Ok(Json(analytics))
}

/// GET /api/analytics/trends - Bucketed spending series
pub async fn get_trends(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendsQuery>,
    request: Request,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let user = current_user(&state, request.headers())?;
    let range = parse_time_range(&query.time_range)?;
    let group_by: TrendGrouping = query
        .group_by
        .parse()
        .map_err(|_| AppError::bad_request("Invalid group_by. Valid: day, week, month"))?;

    let points = state
        .db
        .spending_trends(user.id, range, group_by, Utc::now())?;

    state.db.log_audit(
        &user.email,
        "view",
        Some("trends"),
        None,
        Some(&format!("range={}, group_by={}", range, group_by.as_str())),
    )?;

    Ok(Json(points))
}

/// DELETE /api/analytics/cache - Force recomputation on the next request
pub async fn clear_analytics_cache(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ClearCacheResponse>, AppError> {
    let user = current_user(&state, request.headers())?;

    let removed = state.db.clear_analytics_cache(user.id)?;

    state.db.log_audit(
        &user.email,
        "delete",
        Some("analytics_cache"),
        None,
        Some(&format!("removed={}", removed)),
    )?;

    Ok(Json(ClearCacheResponse { removed }))
}

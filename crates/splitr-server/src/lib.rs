//! Splitr Web Server
//!
//! Axum-based REST API for the Splitr expense-splitting service.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Security response headers (nosniff, frame denial, CSP)
//! - Input validation (body size limits, enum parsing)
//! - Audit logging for all API access (reads and writes)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use splitr_core::db::Database;
use splitr_core::models::User;
use splitr_core::{MockReceiptParser, ReceiptParser};

mod handlers;
mod scheduler;

pub use scheduler::{run_due_recurring, start_recurring_scheduler};

/// Maximum receipt upload size after base64 decoding (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum listing limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the acting user's email
pub const USER_HEADER: &str = "x-splitr-user";

/// Identity used when no user header is present
pub const DEFAULT_USER_EMAIL: &str = "local-dev@splitr.local";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// OCR backend used by receipt scanning
    pub receipt_parser: Arc<dyn ReceiptParser>,
}

/// Extract the acting user's email from request headers
pub fn get_user_email(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| DEFAULT_USER_EMAIL.to_string())
}

/// Resolve the acting user, registering them on first sight
pub fn current_user(state: &AppState, headers: &axum::http::HeaderMap) -> Result<User, AppError> {
    let email = get_user_email(headers);
    Ok(state.db.get_or_create_user(&email)?)
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router with the mock receipt parser
pub fn create_router(db: Database, config: ServerConfig) -> Router {
    create_router_with_parser(db, config, Arc::new(MockReceiptParser::new()))
}

/// Create the application router with a specific receipt parser
pub fn create_router_with_parser(
    db: Database,
    config: ServerConfig,
    receipt_parser: Arc<dyn ReceiptParser>,
) -> Router {
    info!("Receipt parser: {}", receipt_parser.name());

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        receipt_parser,
    });

    let api_routes = Router::new()
        // Identity
        .route("/me", get(handlers::get_me))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/:id", get(handlers::get_expense))
        .route("/expenses/:id/receipt", post(handlers::attach_receipt))
        // Groups
        .route(
            "/groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route("/groups/:id", get(handlers::get_group))
        // Analytics
        .route("/analytics", get(handlers::get_analytics))
        .route("/analytics/trends", get(handlers::get_trends))
        .route("/analytics/cache", delete(handlers::clear_analytics_cache))
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).put(handlers::set_budget),
        )
        .route("/budgets/spending", get(handlers::get_budget_spending))
        .route("/budgets/overview", get(handlers::get_budget_overview))
        // Recurring expenses
        .route(
            "/recurring",
            get(handlers::list_recurring).post(handlers::create_recurring),
        )
        .route("/recurring/due", get(handlers::list_due_recurring))
        .route("/recurring/:id", delete(handlers::delete_recurring))
        .route("/recurring/:id/toggle", post(handlers::toggle_recurring))
        .route(
            "/recurring/:id/materialize",
            post(handlers::materialize_recurring),
        )
        // Suggestions
        .route("/suggestions", get(handlers::list_suggestions))
        .route(
            "/suggestions/generate",
            post(handlers::generate_suggestions),
        )
        .route("/suggestions/:id/use", post(handlers::use_suggestion))
        .route(
            "/suggestions/:id/dismiss",
            post(handlers::dismiss_suggestion),
        )
        // Receipts
        .route("/receipts", get(handlers::list_receipts))
        .route("/receipts/parse", post(handlers::parse_receipt))
        .route("/receipts/analysis", get(handlers::get_receipt_analysis))
        // Audit
        .route("/audit", get(handlers::list_audit_log));

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let allowed_headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::HeaderName::from_static(USER_HEADER),
    ];

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    };

    let csp_value = HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'");

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let interval_secs = db.config().recurring_interval_secs;
    if interval_secs > 0 {
        start_recurring_scheduler(db.clone(), std::time::Duration::from_secs(interval_secs));
    } else {
        info!("ℹ️  Recurring scheduler disabled (set SPLITR_RECURRING_INTERVAL to enable)");
    }

    let app = create_router(db, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn forbidden(msg: &str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        use splitr_core::Error as CoreError;

        let err = err.into();
        let status = match err.downcast_ref::<CoreError>() {
            Some(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(CoreError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            Some(CoreError::InvalidData(_)) | Some(CoreError::Inactive(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(CoreError::Receipt(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            Self {
                status,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                internal: Some(err),
            }
        } else {
            Self {
                status,
                message: err.to_string(),
                internal: None,
            }
        }
    }
}

#[cfg(test)]
mod tests;

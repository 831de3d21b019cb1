//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use base64::Engine;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::json;
use splitr_core::db::Database;
use tower::ServiceExt;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, ServerConfig::default())
}

fn setup_test_app_with_db() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    (create_router(db.clone(), ServerConfig::default()), db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_as(uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_HEADER, user)
        .body(Body::empty())
        .unwrap()
}

fn send_as(method: &str, uri: &str, user: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_HEADER, user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ========== Identity ==========

#[tokio::test]
async fn test_me_defaults_to_local_user() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], DEFAULT_USER_EMAIL);
    assert_eq!(json["identity_source"], "none");
}

#[tokio::test]
async fn test_me_uses_user_header() {
    let app = setup_test_app();

    let response = app.oneshot(get_as("/api/me", "Alice@Example.com")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], ALICE);
    assert_eq!(json["user"]["name"], "alice");
    assert_eq!(json["identity_source"], "header");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get_as("/api/me", ALICE)).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

// ========== Expenses ==========

#[tokio::test]
async fn test_create_and_list_equal_expense() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({
                "description": "Pizza night",
                "amount": 30.0,
                "category": "food",
                "participants": [ALICE, BOB, "carol@example.com"]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    assert_eq!(created["split_type"], "equal");
    let splits = created["splits"].as_array().unwrap();
    assert_eq!(splits.len(), 3);
    assert!((splits[0]["amount"].as_f64().unwrap() - 10.0).abs() < 1e-9);
    assert_eq!(splits[0]["paid"], true);
    assert_eq!(splits[1]["paid"], false);

    // Bob sees the expense he participates in
    let response = app.oneshot(get_as("/api/expenses", BOB)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = get_body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["description"], "Pizza night");
}

#[tokio::test]
async fn test_create_percentage_expense() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({
                "description": "Rent",
                "amount": 1000.0,
                "category": "housing",
                "split_type": "percentage",
                "splits": [
                    { "email": ALICE, "percentage": 60.0 },
                    { "email": BOB, "percentage": 40.0 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = get_body_json(response).await;
    assert!((created["splits"][0]["amount"].as_f64().unwrap() - 600.0).abs() < 1e-9);
    assert!((created["splits"][1]["amount"].as_f64().unwrap() - 400.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_expense_rejects_mismatched_splits() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({
                "description": "Groceries",
                "amount": 50.0,
                "split_type": "exact",
                "splits": [
                    { "email": ALICE, "amount": 20.0 },
                    { "email": BOB, "amount": 20.0 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_expense_non_numeric_amount() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({ "description": "Coffee", "amount": "five" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_create_expense_invalid_json() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/expenses")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_expense_hidden_from_outsiders() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({ "description": "Taxi", "amount": 12.0, "category": "transport" }),
        ))
        .await
        .unwrap();
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get_as(&format!("/api/expenses/{}", id), ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_as(&format!("/api/expenses/{}", id), BOB))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Groups ==========

#[tokio::test]
async fn test_group_expense_requires_membership() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/groups",
            ALICE,
            json!({ "name": "Flat", "members": [BOB] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let group = get_body_json(response).await;
    assert_eq!(group["members"].as_array().unwrap().len(), 2);
    let group_id = group["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            "mallory@example.com",
            json!({ "description": "Snacks", "amount": 5.0, "group_id": group_id }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.oneshot(get_as("/api/groups", BOB)).await.unwrap();
    let groups = get_body_json(response).await;
    assert_eq!(groups.as_array().unwrap().len(), 1);
}

// ========== Analytics ==========

#[tokio::test]
async fn test_analytics_breakdown() {
    let app = setup_test_app();

    for (description, amount, category) in [("Dinner", 60.0, "food"), ("Bus", 40.0, "transport")] {
        let response = app
            .clone()
            .oneshot(send_as(
                "POST",
                "/api/expenses",
                ALICE,
                json!({ "description": description, "amount": amount, "category": category }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get_as("/api/analytics?time_range=week", ALICE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!((json["total_spent"].as_f64().unwrap() - 100.0).abs() < 1e-9);
    assert_eq!(json["top_category"]["name"], "food");
    assert_eq!(json["category_breakdown"][0]["color"], "#8B5CF6");
    assert!((json["category_breakdown"][1]["percentage"].as_f64().unwrap() - 40.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analytics_unknown_time_range() {
    let app = setup_test_app();

    let response = app
        .oneshot(get_as("/api/analytics?time_range=decade", ALICE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trends_week_by_day() {
    let app = setup_test_app();

    let response = app
        .oneshot(get_as("/api/analytics/trends?time_range=week&group_by=day", ALICE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_clear_analytics_cache() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(get_as("/api/analytics", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/analytics/cache")
                .header(USER_HEADER, ALICE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["removed"], 1);
}

// ========== Budgets ==========

#[tokio::test]
async fn test_budget_overview() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "PUT",
            "/api/budgets",
            ALICE,
            json!({ "category": "food", "monthly_limit": 100.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for (description, amount, category) in [("Market", 75.0, "food"), ("Cinema", 20.0, "fun")] {
        app.clone()
            .oneshot(send_as(
                "POST",
                "/api/expenses",
                ALICE,
                json!({ "description": description, "amount": amount, "category": category }),
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(get_as("/api/budgets/overview", ALICE))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["food"]["status"], "warning");
    assert!((json["food"]["remaining"].as_f64().unwrap() - 25.0).abs() < 1e-9);
    assert_eq!(json["fun"]["status"], "no-budget");

    let response = app.oneshot(get_as("/api/budgets", ALICE)).await.unwrap();
    let budgets = get_body_json(response).await;
    assert!((budgets[0]["spent"].as_f64().unwrap() - 75.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_budget_rejects_negative_limit() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "PUT",
            "/api/budgets",
            ALICE,
            json!({ "category": "food", "monthly_limit": -5.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Recurring ==========

#[tokio::test]
async fn test_recurring_unknown_frequency() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/recurring",
            ALICE,
            json!({
                "description": "Gym",
                "amount": 30.0,
                "category": "health",
                "frequency": "fortnightly"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recurring_materialize_and_ownership() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/recurring",
            ALICE,
            json!({
                "description": "Internet",
                "amount": 40.0,
                "category": "utilities",
                "frequency": "monthly",
                "participants": [ALICE, BOB]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let template = get_body_json(response).await;
    let id = template["id"].as_i64().unwrap();

    let uri = format!("/api/recurring/{}/materialize", id);

    let response = app
        .clone()
        .oneshot(send_as("POST", &uri, BOB, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_as("POST", &uri, ALICE, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = get_body_json(response).await;
    assert_eq!(outcome["expense"]["recurring_id"], id);
    assert!((outcome["expense"]["splits"][1]["amount"].as_f64().unwrap() - 20.0).abs() < 1e-9);

    // Pause, then materializing is rejected
    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            &format!("/api/recurring/{}/toggle", id),
            ALICE,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["is_active"], false);

    let response = app
        .oneshot(send_as("POST", &uri, ALICE, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recurring_missing_template() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as("POST", "/api/recurring/999/materialize", ALICE, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scheduler_run_materializes_due_templates() {
    let (_app, db) = setup_test_app_with_db();
    let alice = db.get_or_create_user(ALICE).unwrap();

    let template = splitr_core::models::NewRecurringExpense {
        description: "Cloud storage".to_string(),
        amount: 9.99,
        category: "software".to_string(),
        frequency: splitr_core::models::Frequency::Monthly,
        participants: vec![alice.id],
        group_id: None,
        split_type: Default::default(),
        splits: splitr_core::analytics::equal_template_splits(9.99, &[alice.id]),
    };
    db.create_recurring(alice.id, &template, Utc::now() - Duration::days(40))
        .unwrap();

    assert_eq!(run_due_recurring(&db).unwrap(), 1);
    assert_eq!(run_due_recurring(&db).unwrap(), 0);

    let audit = db.list_audit_log(10).unwrap();
    assert_eq!(audit[0].user_email, "scheduler");
}

// ========== Suggestions ==========

#[tokio::test]
async fn test_generate_and_use_suggestion() {
    let app = setup_test_app();

    for days_ago in [3, 10, 17] {
        let date = (Utc::now() - Duration::days(days_ago)).to_rfc3339();
        let response = app
            .clone()
            .oneshot(send_as(
                "POST",
                "/api/expenses",
                ALICE,
                json!({
                    "description": "Coffee beans",
                    "amount": 18.0,
                    "category": "groceries",
                    "date": date
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(send_as("POST", "/api/suggestions/generate", ALICE, json!({})))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["generated"], 1);

    let response = app
        .clone()
        .oneshot(get_as("/api/suggestions", ALICE))
        .await
        .unwrap();
    let suggestions = get_body_json(response).await;
    assert_eq!(suggestions[0]["frequency"], "weekly");
    let id = suggestions[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            &format!("/api/suggestions/{}/use", id),
            ALICE,
            json!({ "amount": 20.0, "participants": [ALICE, BOB] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let expense = get_body_json(response).await;
    assert!((expense["amount"].as_f64().unwrap() - 20.0).abs() < 1e-9);
    assert_eq!(expense["splits"].as_array().unwrap().len(), 2);

    let response = app.oneshot(get_as("/api/suggestions", ALICE)).await.unwrap();
    assert!(get_body_json(response).await.as_array().unwrap().is_empty());
}

// ========== Receipts ==========

#[tokio::test]
async fn test_parse_receipt() {
    let app = setup_test_app();
    let image = base64::engine::general_purpose::STANDARD.encode(b"fake jpeg bytes");

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/receipts/parse",
            ALICE,
            json!({ "image": image, "filename": "dinner.jpg" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["suggested_expense"]["description"], "Expense at Restaurant ABC");
    assert_eq!(json["suggested_expense"]["category"], "foodDrink");
    assert_eq!(json["image_url"], "https://example.com/receipts/dinner.jpg");
}

#[tokio::test]
async fn test_parse_receipt_bad_base64() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/receipts/parse",
            ALICE,
            json!({ "image": "!!not base64!!", "filename": "dinner.jpg" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_parse_receipt_parser_failure() {
    let db = Database::in_memory().unwrap();
    let app = create_router_with_parser(
        db,
        ServerConfig::default(),
        Arc::new(MockReceiptParser::failing()),
    );
    let image = base64::engine::general_purpose::STANDARD.encode(b"fake jpeg bytes");

    let response = app
        .oneshot(send_as(
            "POST",
            "/api/receipts/parse",
            ALICE,
            json!({ "image": image, "filename": "dinner.jpg" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_attach_receipt_and_analysis() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            "/api/expenses",
            ALICE,
            json!({ "description": "Dinner", "amount": 16.5, "category": "foodDrink" }),
        ))
        .await
        .unwrap();
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            &format!("/api/expenses/{}/receipt", id),
            BOB,
            json!({ "image_url": "https://example.com/receipts/x.jpg" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_as(
            "POST",
            &format!("/api/expenses/{}/receipt", id),
            ALICE,
            json!({
                "image_url": "https://example.com/receipts/x.jpg",
                "receipt_data": { "merchant_name": "Restaurant ABC", "confidence": 0.8 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_as("/api/receipts", ALICE))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(get_as("/api/receipts/analysis", ALICE))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["total_receipts_scanned"], 1);
    assert_eq!(json["top_merchants"]["Restaurant ABC"], 1);
}

// ========== Audit ==========

#[tokio::test]
async fn test_audit_log_records_requests() {
    let app = setup_test_app();

    app.clone()
        .oneshot(get_as("/api/expenses", ALICE))
        .await
        .unwrap();

    let response = app
        .oneshot(get_as("/api/audit?limit=5", ALICE))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["user_email"], ALICE);
    assert_eq!(entries[0]["entity_type"], "expense");
}

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{bearer, TestApp, BOOTSTRAP_ADMIN};
use basecamp_store::{RateLimiter, RedisClient};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn future_date(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days)).to_string()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Lina", "email": "Lina@Example.com ", "password": "hunter22" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "lina@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password_hash").is_none());

    let duplicate = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Other", "email": "lina@example.com", "password": "hunter22" }))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);
    let body: Value = duplicate.json();
    assert_eq!(body["success"], false);

    let login = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "lina@example.com", "password": "hunter22" }))
        .await;
    login.assert_status_ok();
    let body: Value = login.json();
    assert!(body["data"]["token"].as_str().is_some());

    let wrong = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "lina@example.com", "password": "wrong-password" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();
    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": " ", "email": "not-an-email", "password": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("name is required"));
    assert!(error.contains("email is invalid"));
}

#[tokio::test]
async fn test_bootstrap_admin_gets_admin_role() {
    let app = TestApp::new();
    let (_, token) = app.register("Root", BOOTSTRAP_ADMIN).await;

    let response = app.server.get("/api/users/me").add_header("Authorization", bearer(&token)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["role"], "admin");
}

#[tokio::test]
async fn test_admin_endpoints_require_admin() {
    let app = TestApp::new();
    let (_, user) = app.register("Sam", "sam@example.com").await;
    let admin = app.admin_token().await;

    app.server.get("/api/users").await.assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/api/users")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/api/users")
        .add_header("Authorization", bearer(&user))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .get("/api/bookings")
        .add_header("Authorization", bearer(&user))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .post("/api/tours")
        .json(&json!({ "title": "x", "location": "y", "price_cents": 1, "duration_days": 1 }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let response = app.server.get("/api/users").add_header("Authorization", bearer(&admin)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_user_profile_access_and_admin_update() {
    let app = TestApp::new();
    let (sam_id, sam) = app.register("Sam", "sam@example.com").await;
    let (kim_id, _) = app.register("Kim", "kim@example.com").await;
    let admin = app.admin_token().await;

    app.server
        .get(&format!("/api/users/{}", sam_id))
        .add_header("Authorization", bearer(&sam))
        .await
        .assert_status_ok();
    app.server
        .get(&format!("/api/users/{}", kim_id))
        .add_header("Authorization", bearer(&sam))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .get(&format!("/api/users/{}", Uuid::new_v4()))
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .put(&format!("/api/users/{}", kim_id))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "role": "admin", "department": "Guides", "permissions": ["tours", "tours", " bookings "] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["department"], "Guides");
    assert_eq!(body["data"]["permissions"], json!(["bookings", "tours"]));

    app.server
        .put(&format!("/api/users/{}", kim_id))
        .add_header("Authorization", bearer(&sam))
        .json(&json!({ "role": "admin" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tour_crud() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let tour_id = app.create_tour(&admin, 45_000, Some(8)).await;

    let response = app.server.get("/api/tours").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let updated = app
        .server
        .put(&format!("/api/tours/{}", tour_id))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({
            "title": "Glacier Trek (extended)",
            "location": "Patagonia",
            "price_cents": 52_000,
            "duration_days": 4,
        }))
        .await;
    updated.assert_status_ok();
    let body: Value = updated.json();
    assert_eq!(body["data"]["price_cents"], 52_000);
    assert_eq!(body["data"]["max_group_size"], Value::Null);

    let invalid = app
        .server
        .post("/api/tours")
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "title": "", "location": "Nowhere", "price_cents": -5, "duration_days": 0 }))
        .await;
    invalid.assert_status(StatusCode::BAD_REQUEST);

    let deleted = app
        .server
        .delete(&format!("/api/tours/{}", tour_id))
        .add_header("Authorization", bearer(&admin))
        .await;
    deleted.assert_status_ok();
    let body: Value = deleted.json();
    assert_eq!(body["message"], "Tour deleted");

    app.server
        .get(&format!("/api/tours/{}", tour_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server.get("/api/tours/not-a-uuid").await.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_crud() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .server
        .post("/api/events")
        .add_header("Authorization", bearer(&admin))
        .json(&json!({
            "title": "Star Party",
            "location": "Atacama",
            "starts_at": (Utc::now() + Duration::days(10)).to_rfc3339(),
            "price_cents": 2_500,
            "capacity": 40,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    app.server
        .get(&format!("/api/events/{}", event_id))
        .await
        .assert_status_ok();
    app.server
        .delete(&format!("/api/events/{}", event_id))
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status_ok();
    app.server
        .delete(&format!("/api/events/{}", event_id))
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (sam_id, sam) = app.register("Sam", "sam@example.com").await;
    let (kim_id, kim) = app.register("Kim", "kim@example.com").await;
    let tour_id = app.create_tour(&admin, 45_000, Some(6)).await;

    let response = app
        .server
        .post("/api/bookings")
        .add_header("Authorization", bearer(&sam))
        .json(&json!({ "tour_id": tour_id, "travel_date": future_date(14), "participants": 2 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["user_id"], sam_id.as_str());
    assert_eq!(body["data"]["participants"], 2);
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    // participants defaults to one
    let single = app
        .server
        .post("/api/bookings")
        .add_header("Authorization", bearer(&kim))
        .json(&json!({ "tour_id": tour_id, "travel_date": future_date(20) }))
        .await;
    single.assert_status(StatusCode::CREATED);
    let body: Value = single.json();
    assert_eq!(body["data"]["participants"], 1);

    let mine = app
        .server
        .get(&format!("/api/bookings/user/{}", sam_id))
        .add_header("Authorization", bearer(&sam))
        .await;
    mine.assert_status_ok();
    let body: Value = mine.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    app.server
        .get(&format!("/api/bookings/user/{}", kim_id))
        .add_header("Authorization", bearer(&sam))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let by_tour = app
        .server
        .get(&format!("/api/bookings/tour/{}", tour_id))
        .add_header("Authorization", bearer(&sam))
        .await;
    by_tour.assert_status_ok();
    let body: Value = by_tour.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let confirmed = app
        .server
        .patch(&format!("/api/bookings/{}/status", booking_id))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "status": "confirmed" }))
        .await;
    confirmed.assert_status_ok();
    let body: Value = confirmed.json();
    assert_eq!(body["data"]["status"], "CONFIRMED");

    app.server
        .patch(&format!("/api/bookings/{}/status", booking_id))
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "status": "LOST" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let all = app.server.get("/api/bookings").add_header("Authorization", bearer(&admin)).await;
    all.assert_status_ok();
    let body: Value = all.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    app.server
        .delete(&format!("/api/bookings/{}", booking_id))
        .add_header("Authorization", bearer(&admin))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_booking_validation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, sam) = app.register("Sam", "sam@example.com").await;
    let tour_id = app.create_tour(&admin, 10_000, Some(4)).await;

    app.server
        .post("/api/bookings")
        .add_header("Authorization", bearer(&sam))
        .json(&json!({ "tour_id": Uuid::new_v4(), "travel_date": future_date(5) }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post("/api/bookings")
        .add_header("Authorization", bearer(&sam))
        .json(&json!({ "tour_id": tour_id, "travel_date": future_date(-3) }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/bookings")
        .add_header("Authorization", bearer(&sam))
        .json(&json!({ "tour_id": tour_id, "travel_date": future_date(5), "participants": 5 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .post("/api/bookings")
        .json(&json!({ "tour_id": tour_id, "travel_date": future_date(5) }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_unknown_booking_is_not_found() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let response = app
        .server
        .delete(&format!("/api/bookings/{}", Uuid::new_v4()))
        .add_header("Authorization", bearer(&admin))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Booking not found");
}

#[tokio::test]
async fn test_metrics_endpoint_counts_requests() {
    let app = TestApp::new();
    app.server.get("/health").await.assert_status_ok();

    let response = app.server.get("/metrics").await;
    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains(r#"basecamp_http_requests_total{method="GET",status="200"}"#));
}

/// Fixed window that never rolls over, enough to hit the limit in a test.
#[derive(Default)]
struct CountingLimiter {
    hits: Mutex<HashMap<String, i64>>,
}

#[async_trait::async_trait]
impl RateLimiter for CountingLimiter {
    async fn check_rate_limit(&self, key: &str, limit: i64, _window_seconds: i64) -> redis::RedisResult<bool> {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count <= limit)
    }
}

#[tokio::test]
async fn test_requests_unlimited_without_limiter() {
    let app = TestApp::new();
    for _ in 0..20 {
        app.server.get("/health").await.assert_status_ok();
    }
}

#[tokio::test]
async fn test_rate_limit_rejects_over_limit() {
    let limiter = Arc::new(CountingLimiter::default());
    let app = TestApp::with_state(|state| state.with_rate_limit(limiter.clone(), 2));

    app.server.get("/health").await.assert_status_ok();
    app.server.get("/api/tours").await.assert_status_ok();

    let response = app.server.get("/health").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Rate limit exceeded");
    assert_eq!(limiter.hits.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rate_limit_fails_open_when_redis_is_down() {
    // Nothing listens on port 1, so every check errors.
    let redis = RedisClient::new("redis://127.0.0.1:1/").unwrap();
    let app = TestApp::with_state(|state| state.with_rate_limit(Arc::new(redis), 1));

    for _ in 0..3 {
        app.server.get("/health").await.assert_status_ok();
    }
}

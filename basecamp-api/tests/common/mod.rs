#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use basecamp_api::{
    app,
    middleware::issue_token,
    state::{AppState, AuthConfig, UploadConfig},
};
use basecamp_core::password::hash_password;
use basecamp_core::{Role, User};
use basecamp_store::Repositories;
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const MAX_IMAGE_BYTES: usize = 1024;
pub const BOOTSTRAP_ADMIN: &str = "root@basecamp.test";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_state(|state| state)
    }

    /// Lets a test swap repositories or add a rate limiter before serving.
    pub fn with_state(customize: impl FnOnce(AppState) -> AppState) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let state = AppState::new(
            Repositories::in_memory(),
            AuthConfig {
                secret: "test-secret".to_string(),
                expiration: 3600,
                bootstrap_admin_email: Some(BOOTSTRAP_ADMIN.to_string()),
            },
            UploadConfig {
                dir: uploads.path().to_path_buf(),
                max_image_bytes: MAX_IMAGE_BYTES,
            },
        )
        .unwrap();
        let state = customize(state);

        let server = TestServer::new(app(state.clone())).unwrap();
        Self { server, state, uploads }
    }

    /// Registers through the API and returns (user id, token).
    pub async fn register(&self, name: &str, email: &str) -> (String, String) {
        let response = self
            .server
            .post("/api/auth/register")
            .json(&json!({ "name": name, "email": email, "password": "hunter22" }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        (
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
            body["data"]["token"].as_str().unwrap().to_string(),
        )
    }

    /// Inserts an admin straight into the store and returns a token for it.
    pub async fn admin_token(&self) -> String {
        let admin = User::new(
            "Admin",
            &format!("admin-{}@basecamp.test", uuid::Uuid::new_v4()),
            hash_password("hunter22").unwrap(),
            Role::Admin,
        );
        self.state.repos.users.create_user(&admin).await.unwrap();
        issue_token(&self.state.auth, &admin).unwrap()
    }

    pub async fn create_tour(&self, admin: &str, price_cents: i64, max_group_size: Option<i32>) -> String {
        let response = self
            .server
            .post("/api/tours")
            .add_header("Authorization", bearer(admin))
            .json(&json!({
                "title": "Glacier Trek",
                "description": "Three days on the ice",
                "location": "Patagonia",
                "price_cents": price_cents,
                "duration_days": 3,
                "max_group_size": max_group_size,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_equipment(&self, admin: &str, name: &str, price: i64, rental: i64, quantity: i32) -> String {
        let form = MultipartForm::new()
            .add_text("name", name)
            .add_text("category", "camping")
            .add_text("price_cents", price.to_string())
            .add_text("rental_price_cents", rental.to_string())
            .add_text("quantity", quantity.to_string());

        let response = self
            .server
            .post("/api/equipment")
            .add_header("Authorization", bearer(admin))
            .multipart(form)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn png_part(size: usize) -> Part {
    Part::bytes(vec![0x89u8; size]).file_name("photo.png").mime_type("image/png")
}

/// A card that passes validation for the next couple of years.
pub fn valid_card() -> Value {
    let year = (Utc::now().year() + 2) % 100;
    json!({
        "card_holder": "Ada Lovelace",
        "card_number": "4242-4242-4242-4242",
        "expiry": format!("12/{:02}", year),
        "cvv": "123",
    })
}

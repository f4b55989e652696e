use axum::{extract::State, routing::post, Router};
use basecamp_core::password::{hash_password, verify_password};
use basecamp_core::repository::RepositoryError;
use basecamp_core::user::{normalize_email, validate_registration};
use basecamp_core::{Role, User};
use basecamp_shared::Masked;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    extract::ApiJson,
    middleware::issue_token,
    response::{created, ok, ApiCreated, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Masked<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiCreated<AuthResponse> {
    validate_registration(&req.name, &req.email, req.password.expose())?;

    let email = normalize_email(&req.email);
    let is_bootstrap_admin = state
        .auth
        .bootstrap_admin_email
        .as_deref()
        .is_some_and(|admin| normalize_email(admin) == email);
    let role = if is_bootstrap_admin { Role::Admin } else { Role::User };

    let password_hash = hash_password(req.password.expose())?;
    let user = User::new(&req.name, &email, password_hash, role);

    state.repos.users.create_user(&user).await.map_err(|e| match e {
        RepositoryError::Duplicate(_) => AppError::ConflictError("Email is already registered".to_string()),
        other => other.into(),
    })?;

    tracing::info!("Registered user {} ({})", user.id, user.role);
    let token = issue_token(&state.auth, &user)?;
    Ok(created(AuthResponse { token, user }))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let invalid = || AppError::AuthenticationError("Invalid email or password".to_string());

    let user = state
        .repos
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(req.password.expose(), &user.password_hash)? {
        return Err(invalid());
    }

    let token = issue_token(&state.auth, &user)?;
    Ok(ok(AuthResponse { token, user }))
}

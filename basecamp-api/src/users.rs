use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, put},
    Extension, Router,
};
use basecamp_core::{User, UserUpdate};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::{require_admin, require_auth, Claims},
    response::{ok, ApiResult},
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let authed = Router::new()
        .route("/users/me", get(me))
        .route("/users/{id}", get(get_user))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    authed.merge(admin)
}

async fn me(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<User> {
    let user = state
        .repos
        .users
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ok(user))
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ok(state.repos.users.list_users().await?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<User> {
    claims.ensure_self_or_admin(id)?;

    let user = state
        .repos
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ok(user))
}

async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    let mut user = state
        .repos
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    user.apply(update);
    if !state.repos.users.update_user(&user).await? {
        return Err(AppError::not_found("User"));
    }

    tracing::info!("Updated user {}: role={}, department={:?}", user.id, user.role, user.department);
    Ok(ok(user))
}

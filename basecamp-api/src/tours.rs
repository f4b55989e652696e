use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use basecamp_core::{Tour, TourInput};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::{require_admin, require_auth},
    response::{created, message, ok, ApiCreated, ApiResult},
    state::AppState,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/{id}", get(get_tour));

    let admin = Router::new()
        .route("/tours", post(create_tour))
        .route("/tours/{id}", put(update_tour).delete(delete_tour))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    public.merge(admin)
}

async fn list_tours(State(state): State<AppState>) -> ApiResult<Vec<Tour>> {
    Ok(ok(state.repos.tours.list_tours().await?))
}

async fn get_tour(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Tour> {
    let tour = state
        .repos
        .tours
        .get_tour(id)
        .await?
        .ok_or_else(|| AppError::not_found("Tour"))?;
    Ok(ok(tour))
}

async fn create_tour(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TourInput>,
) -> ApiCreated<Tour> {
    input.validate()?;
    let tour = Tour::from_input(input);
    state.repos.tours.create_tour(&tour).await?;

    tracing::info!("Created tour {} ({})", tour.id, tour.title);
    Ok(created(tour))
}

async fn update_tour(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<TourInput>,
) -> ApiResult<Tour> {
    input.validate()?;
    let mut tour = state
        .repos
        .tours
        .get_tour(id)
        .await?
        .ok_or_else(|| AppError::not_found("Tour"))?;

    tour.apply(input);
    if !state.repos.tours.update_tour(&tour).await? {
        return Err(AppError::not_found("Tour"));
    }
    Ok(ok(tour))
}

async fn delete_tour(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    if !state.repos.tours.delete_tour(id).await? {
        return Err(AppError::not_found("Tour"));
    }
    tracing::info!("Deleted tour {}", id);
    Ok(message("Tour deleted"))
}

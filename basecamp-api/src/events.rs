use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
    Router,
};
use basecamp_core::{Event, EventInput};
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
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event));

    let admin = Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", delete(delete_event))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    public.merge(admin)
}

async fn list_events(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    Ok(ok(state.repos.events.list_events().await?))
}

async fn get_event(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Event> {
    let event = state
        .repos
        .events
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;
    Ok(ok(event))
}

async fn create_event(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EventInput>,
) -> ApiCreated<Event> {
    input.validate()?;
    let event = Event::from_input(input);
    state.repos.events.create_event(&event).await?;

    tracing::info!("Created event {} ({})", event.id, event.title);
    Ok(created(event))
}

async fn delete_event(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    if !state.repos.events.delete_event(id).await? {
        return Err(AppError::not_found("Event"));
    }
    Ok(message("Event deleted"))
}

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Extension, Router,
};
use basecamp_core::booking::validate_new_booking;
use basecamp_core::{Booking, BookingStatus};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::{require_admin, require_auth, Claims},
    response::{created, message, ok, ApiCreated, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: Uuid,
    pub travel_date: NaiveDate,
    pub participants: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let authed = Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/user/{user_id}", get(list_user_bookings))
        .route("/bookings/tour/{tour_id}", get(list_tour_bookings))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", delete(delete_booking))
        .route("/bookings/{id}/status", patch(update_status))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    authed.merge(admin)
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> ApiCreated<Booking> {
    let tour = state
        .repos
        .tours
        .get_tour(req.tour_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tour"))?;

    let participants = req.participants.unwrap_or(1);
    let today = Utc::now().date_naive();
    validate_new_booking(req.travel_date, participants, today, tour.max_group_size)?;

    let booking = Booking::new(claims.sub, tour.id, req.travel_date, participants);
    state.repos.bookings.create_booking(&booking).await?;

    tracing::info!(
        "Booking {} created: user={}, tour={}, date={}",
        booking.id,
        booking.user_id,
        booking.tour_id,
        booking.travel_date
    );
    Ok(created(booking))
}

async fn list_bookings(State(state): State<AppState>) -> ApiResult<Vec<Booking>> {
    Ok(ok(state.repos.bookings.list_bookings().await?))
}

async fn list_user_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Booking>> {
    claims.ensure_self_or_admin(user_id)?;
    Ok(ok(state.repos.bookings.list_by_user(user_id).await?))
}

async fn list_tour_bookings(
    State(state): State<AppState>,
    ApiPath(tour_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Booking>> {
    Ok(ok(state.repos.bookings.list_by_tour(tour_id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Booking> {
    let status: BookingStatus = req.status.parse()?;

    let booking = state
        .repos
        .bookings
        .update_status(id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Booking"))?;

    tracing::info!("Booking {} moved to {}", booking.id, booking.status);
    Ok(ok(booking))
}

async fn delete_booking(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<()> {
    if !state.repos.bookings.delete_booking(id).await? {
        return Err(AppError::not_found("Booking"));
    }
    tracing::info!("Deleted booking {}", id);
    Ok(message("Booking deleted"))
}

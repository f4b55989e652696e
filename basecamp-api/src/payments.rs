use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Extension, Router,
};
use basecamp_core::repository::ReviewUpdate;
use basecamp_core::{Payment, PaymentStatus};
use basecamp_order::{validate_card, CardDetails, Checkout, PaymentReview, ReviewError, VerifiedCard};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::{require_admin, require_auth, Claims},
    response::{created, ok, ApiCreated, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CartPaymentRequest {
    pub card: CardDetails,
}

#[derive(Debug, Deserialize)]
pub struct EventPaymentRequest {
    pub event_id: Uuid,
    pub tickets: i32,
    pub card: CardDetails,
}

#[derive(Debug, Deserialize)]
pub struct TourPaymentRequest {
    pub tour_id: Uuid,
    pub participants: i32,
    pub card: CardDetails,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let authed = Router::new()
        .route("/payments/cart", post(pay_cart))
        .route("/payments/event", post(pay_event))
        .route("/payments/tour", post(pay_tour))
        .route("/payments/orders", get(my_orders))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/{id}/status", patch(review_payment))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth));

    authed.merge(admin)
}

fn verify(card: &CardDetails) -> Result<VerifiedCard, AppError> {
    Ok(validate_card(card, Utc::now().date_naive())?)
}

fn log_submitted(payment: &Payment) {
    tracing::info!(
        "Payment {} submitted: user={}, kind={}, amount_cents={}, card=****{}",
        payment.id,
        payment.user_id,
        payment.kind,
        payment.amount_cents,
        payment.card_last4
    );
}

async fn record(state: &AppState, payment: Payment) -> Result<Payment, AppError> {
    state.repos.payments.create_payment(&payment).await?;
    log_submitted(&payment);
    Ok(payment)
}

async fn pay_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CartPaymentRequest>,
) -> ApiCreated<Payment> {
    let card = verify(&req.card)?;
    let items = state.repos.cart.list_items(claims.sub).await?;
    let payment = Checkout::for_cart(claims.sub, &items, card)?;

    let line_ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    if !state.repos.payments.checkout_cart(&payment, &line_ids).await? {
        return Err(AppError::ConflictError(
            "Cart changed during checkout, please review it and try again".to_string(),
        ));
    }
    log_submitted(&payment);

    Ok(created(payment))
}

async fn pay_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<EventPaymentRequest>,
) -> ApiCreated<Payment> {
    let card = verify(&req.card)?;
    let event = state
        .repos
        .events
        .get_event(req.event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event"))?;

    let payment = record(&state, Checkout::for_event(claims.sub, &event, req.tickets, card)?).await?;
    Ok(created(payment))
}

async fn pay_tour(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<TourPaymentRequest>,
) -> ApiCreated<Payment> {
    let card = verify(&req.card)?;
    let tour = state
        .repos
        .tours
        .get_tour(req.tour_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tour"))?;

    let payment = record(&state, Checkout::for_tour(claims.sub, &tour, req.participants, card)?).await?;
    Ok(created(payment))
}

async fn my_orders(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<Vec<Payment>> {
    Ok(ok(state.repos.payments.list_by_user(claims.sub).await?))
}

async fn list_payments(State(state): State<AppState>) -> ApiResult<Vec<Payment>> {
    Ok(ok(state.repos.payments.list_payments().await?))
}

async fn review_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> ApiResult<Payment> {
    let decision: PaymentStatus = req.status.parse()?;
    let mut payment = state
        .repos
        .payments
        .get_payment(id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment"))?;

    PaymentReview::decide(&mut payment, decision)?;
    match state.repos.payments.update_review(&payment).await? {
        ReviewUpdate::Applied => Ok(ok(payment)),
        ReviewUpdate::NotFound => Err(AppError::not_found("Payment")),
        ReviewUpdate::AlreadyReviewed(current) => Err(ReviewError::InvalidTransition {
            from: current.to_string(),
            to: decision.to_string(),
        }
        .into()),
    }
}

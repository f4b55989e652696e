use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};
use basecamp_catalog::{ensure_in_stock, quote_cart, validate_rental, CartQuote, InventoryError};
use basecamp_core::{CartItem, RentalPeriod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::{require_auth, Claims},
    response::{message, ok, ApiResponse, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub equipment_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
    #[serde(default)]
    pub is_rental: bool,
    pub rental_start: Option<DateTime<Utc>>,
    pub rental_end: Option<DateTime<Utc>>,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub quote: CartQuote,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cart", get(own_cart).delete(clear_cart))
        .route("/cart/{user_id}", get(user_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{id}", put(update_item).delete(remove_item))
        .route_layer(from_fn_with_state(state, require_auth))
}

async fn load_cart(state: &AppState, user_id: Uuid) -> Result<CartView, AppError> {
    let items = state.repos.cart.list_items(user_id).await?;
    let quote = quote_cart(&items)?;
    Ok(CartView { items, quote })
}

/// Quantity of `equipment_id` the user holds outside line `except`.
fn held_elsewhere(items: &[CartItem], equipment_id: Uuid, except: Option<Uuid>) -> i32 {
    items
        .iter()
        .filter(|i| i.equipment_id == equipment_id && Some(i.id) != except)
        .map(|i| i.quantity)
        .sum()
}

async fn own_cart(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<CartView> {
    Ok(ok(load_cart(&state, claims.sub).await?))
}

async fn user_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<CartView> {
    claims.ensure_self_or_admin(user_id)?;
    Ok(ok(load_cart(&state, user_id).await?))
}

async fn add_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CartItem>>), AppError> {
    if req.quantity < 1 {
        return Err(InventoryError::InvalidQuantity(req.quantity).into());
    }

    let equipment = state
        .repos
        .equipment
        .get_equipment(req.equipment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment"))?;

    let rental = if req.is_rental {
        let (Some(start), Some(end)) = (req.rental_start, req.rental_end) else {
            return Err(AppError::ValidationError(
                "rental_start and rental_end are required for rentals".to_string(),
            ));
        };
        let period = RentalPeriod { start, end };
        validate_rental(&period, Utc::now().date_naive())?;
        Some(period)
    } else {
        None
    };

    let items = state.repos.cart.list_items(claims.sub).await?;
    let existing = items.iter().find(|i| i.same_line(equipment.id, rental.as_ref()));

    match existing {
        Some(line) => {
            let requested = line.quantity.saturating_add(req.quantity);
            ensure_in_stock(&equipment, held_elsewhere(&items, equipment.id, Some(line.id)), requested)?;

            let updated = state
                .repos
                .cart
                .update_quantity(line.id, requested)
                .await?
                .ok_or_else(|| AppError::not_found("Cart item"))?;
            tracing::debug!("Merged into cart line {} (quantity {})", updated.id, updated.quantity);
            Ok((StatusCode::OK, ok(updated)))
        }
        None => {
            ensure_in_stock(&equipment, held_elsewhere(&items, equipment.id, None), req.quantity)?;

            let unit_price = if rental.is_some() {
                equipment.rental_price_cents
            } else {
                equipment.price_cents
            };
            let item = CartItem::new(
                claims.sub,
                equipment.id,
                equipment.name.clone(),
                unit_price,
                req.quantity,
                rental,
            );
            state.repos.cart.insert_item(&item).await?;
            tracing::debug!("Added cart line {} for user {}", item.id, claims.sub);
            Ok((StatusCode::CREATED, ok(item)))
        }
    }
}

async fn owned_item(state: &AppState, claims: &Claims, id: Uuid) -> Result<CartItem, AppError> {
    let item = state
        .repos
        .cart
        .get_item(id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))?;
    claims.ensure_self_or_admin(item.user_id)?;
    Ok(item)
}

async fn update_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<QuantityRequest>,
) -> ApiResult<CartItem> {
    let item = owned_item(&state, &claims, id).await?;
    let equipment = state
        .repos
        .equipment
        .get_equipment(item.equipment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Equipment"))?;

    let items = state.repos.cart.list_items(item.user_id).await?;
    ensure_in_stock(&equipment, held_elsewhere(&items, equipment.id, Some(item.id)), req.quantity)?;

    let updated = state
        .repos
        .cart
        .update_quantity(item.id, req.quantity)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))?;
    Ok(ok(updated))
}

async fn remove_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    let item = owned_item(&state, &claims, id).await?;
    if !state.repos.cart.remove_item(item.id).await? {
        return Err(AppError::not_found("Cart item"));
    }
    Ok(message("Item removed from cart"))
}

async fn clear_cart(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> ApiResult<()> {
    let removed = state.repos.cart.clear(claims.sub).await?;
    tracing::debug!("Cleared {} cart lines for user {}", removed, claims.sub);
    Ok(message("Cart cleared"))
}

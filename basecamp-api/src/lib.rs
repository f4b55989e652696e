use axum::{
    http::{header, Method},
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod cart;
pub mod equipment;
pub mod error;
pub mod events;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod payments;
pub mod response;
pub mod state;
pub mod tours;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::USER_AGENT]);

    let api = Router::new()
        .merge(auth::routes())
        .merge(users::routes(state.clone()))
        .merge(tours::routes(state.clone()))
        .merge(events::routes(state.clone()))
        .merge(bookings::routes(state.clone()))
        .merge(equipment::routes(state.clone()))
        .merge(cart::routes(state.clone()))
        .merge(payments::routes(state.clone()));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .nest_service("/uploads", ServeDir::new(&state.uploads.dir))
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

pub mod events;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Open events
        .route("/events", get(events::get_open_events))
        // Registration
        .route("/events/apply", post(events::apply))
        .route(
            "/events/registrations/{user_id}",
            get(events::get_user_registrations),
        )
        // Health check
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Gestures
        .route("/conversation/turn", post(handlers::begin_turn))
        .route("/conversation/stop", post(handlers::stop))
        // Session queries
        .route("/conversation/status", get(handlers::get_status))
        .route("/conversation/messages", get(handlers::get_messages))
        // Browser front-ends call from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

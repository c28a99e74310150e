use super::state::AppState;
use crate::chat::ChatMessage;
use crate::turn::SessionSnapshot;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GestureResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn gesture_response(state: &AppState, delivered: bool, action: &str) -> axum::response::Response {
    let session_id = state.status.borrow().session_id.clone();

    if !delivered {
        error!("Turn controller for session {} is not running", session_id);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: format!("Session {} is not running", session_id),
            }),
        )
            .into_response();
    }

    (
        StatusCode::ACCEPTED,
        Json(GestureResponse {
            session_id: session_id.clone(),
            status: "accepted".to_string(),
            message: format!("{} requested for session {}", action, session_id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /conversation/turn
/// Begin a turn: start listening if the session is idle
pub async fn begin_turn(State(state): State<AppState>) -> impl IntoResponse {
    info!("Begin turn requested");
    let delivered = state.events.begin_turn();
    gesture_response(&state, delivered, "Turn")
}

/// POST /conversation/stop
/// Stop capture/playback and go idle
pub async fn stop(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stop requested");
    let delivered = state.events.stop();
    gesture_response(&state, delivered, "Stop")
}

/// GET /conversation/status
pub async fn get_status(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let snapshot = state.status.borrow().clone();
    Json(snapshot)
}

/// GET /conversation/messages
/// Chat lines rendered so far, oldest first
pub async fn get_messages(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.chat.messages())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

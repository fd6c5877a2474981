//! API route handlers.

pub mod auth;
pub mod chatroom;
pub mod meeting;

use crate::auth::middleware::AppState;
use crate::error::AppError;
use axum::{routing::get, routing::patch, routing::post, Router};

/// Validate that a string is a valid nanoid (alphanumeric, hyphens, underscores).
pub fn validate_id(id: &str, label: &str, expected_len: usize) -> Result<(), AppError> {
    if id.len() != expected_len
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(format!("Invalid {} format", label)));
    }
    Ok(())
}

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth endpoints
        .route("/api/auth/challenge", post(auth::request_challenge))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/session", get(auth::session_status))
        .route("/api/auth/logout", post(auth::logout))
        // Chatroom endpoints
        .route(
            "/api/chatrooms",
            post(chatroom::create_chatroom).get(chatroom::list_chatrooms),
        )
        .route("/api/chatrooms/{id}", get(chatroom::get_chatroom))
        .route("/api/chatrooms/{id}/join", post(chatroom::join_chatroom))
        .route("/api/chatrooms/{id}/close", patch(chatroom::close_chatroom))
        .route(
            "/api/chatrooms/{id}/messages",
            get(chatroom::get_messages).post(chatroom::post_message),
        )
        // Meeting endpoints
        .route("/api/meetings", post(meeting::create_meeting))
        .route("/api/meetings/{id}", get(meeting::get_meeting))
        .route("/api/meetings/{id}/join", post(meeting::join_meeting))
        .route("/api/meetings/{id}/close", patch(meeting::close_meeting))
}

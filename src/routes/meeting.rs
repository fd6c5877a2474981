//! Meeting API endpoints.
//!
//! Meetings wrap an external video session and follow the chatroom
//! lifecycle: host-only close, joins gated on the active flag.

use crate::access;
use crate::auth::middleware::{AppState, AuthSession};
use crate::error::AppError;
use crate::models::{CreateMeetingRequest, StoredMeeting};
use crate::registry;
use crate::routes::validate_id;
use crate::storage;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

async fn redis_con(state: &AppState) -> Result<redis::aio::MultiplexedConnection, AppError> {
    state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Dependency(format!("Redis connection error: {}", e)))
}

/// POST /api/meetings — Create a meeting
pub async fn create_meeting(
    session: AuthSession,
    State(state): State<AppState>,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.title.is_empty() || req.title.len() > 128 {
        return Err(AppError::BadRequest(
            "Meeting title must be 1-128 characters".to_string(),
        ));
    }
    if req.session_id.is_empty() {
        return Err(AppError::BadRequest(
            "Missing video session id".to_string(),
        ));
    }
    // Token gating requires both token fields
    if req.token_gated && (req.token_address.is_none() || req.token_standard.is_none()) {
        return Err(AppError::BadRequest(
            "Token address and standard are required for token-gated meetings".to_string(),
        ));
    }

    let mut con = redis_con(&state).await?;
    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;

    let meeting = StoredMeeting {
        id: nanoid::nanoid!(12),
        host_id: user.id.clone(),
        title: req.title,
        session_id: req.session_id,
        token_gated: req.token_gated,
        token_address: req.token_address,
        token_standard: req.token_standard,
        is_active: true,
        created_at: now_secs(),
    };

    storage::meeting::store_meeting(&mut con, &meeting).await?;
    // The host participates from the start
    storage::meeting::add_participant(&mut con, &meeting.id, &user.id).await?;

    tracing::info!(
        action = "meeting_created",
        meeting_id = %meeting.id,
        host_id = %user.id,
        token_gated = meeting.token_gated,
        "Meeting created"
    );

    let participants = storage::meeting::get_participants(&mut con, &meeting.id).await?;
    Ok((StatusCode::CREATED, Json(meeting.to_info(participants))))
}

/// GET /api/meetings/:id — Fetch one meeting with its participants
pub async fn get_meeting(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "meeting id", 12)?;

    let mut con = redis_con(&state).await?;
    let meeting = storage::meeting::get_meeting(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting not found".to_string()))?;

    let participants = storage::meeting::get_participants(&mut con, &id).await?;
    Ok(Json(meeting.to_info(participants)))
}

/// POST /api/meetings/:id/join — Join a meeting
pub async fn join_meeting(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "meeting id", 12)?;

    let mut con = redis_con(&state).await?;
    let meeting = storage::meeting::get_meeting(&mut con, &id).await?;

    access::can_join_meeting(meeting.as_ref()).map_err(|d| d.into_app_error("Meeting"))?;

    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;
    let newly_added = storage::meeting::add_participant(&mut con, &id, &user.id).await?;

    if newly_added {
        tracing::info!(action = "meeting_joined", meeting_id = %id, user_id = %user.id, "User joined meeting");
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": if newly_added {
            "Successfully joined the meeting"
        } else {
            "Already a participant of this meeting"
        }
    })))
}

/// PATCH /api/meetings/:id/close — Close a meeting (host only)
pub async fn close_meeting(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "meeting id", 12)?;

    let mut con = redis_con(&state).await?;
    let meeting = storage::meeting::get_meeting(&mut con, &id).await?;
    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;

    access::can_close_meeting(meeting.as_ref(), &user.id)
        .map_err(|d| d.into_app_error("Meeting"))?;

    storage::meeting::set_meeting_inactive(&mut con, &id).await?;

    tracing::info!(action = "meeting_closed", meeting_id = %id, user_id = %user.id, "Meeting closed by host");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Meeting closed successfully"
    })))
}

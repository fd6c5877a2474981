//! Chatroom API endpoints.
//!
//! Every handler follows the authenticated-request contract: validate the
//! session (extractor), resolve the user through the registry, then hand
//! the resource snapshot to the access engine before mutating anything.

use crate::access;
use crate::auth::middleware::{AppState, AuthSession};
use crate::cipher::ScopeKey;
use crate::error::AppError;
use crate::models::{
    CreateChatroomRequest, MessageInfo, MessageQuery, PostMessageRequest, StoredChatroom,
    StoredMessage,
};
use crate::registry;
use crate::routes::validate_id;
use crate::storage;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use std::time::{SystemTime, UNIX_EPOCH};

const DEFAULT_MESSAGE_LIMIT: usize = 15;
const MAX_MESSAGE_LIMIT: usize = 100;

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

/// POST /api/chatrooms — Create a chatroom
pub async fn create_chatroom(
    session: AuthSession,
    State(state): State<AppState>,
    Json(req): Json<CreateChatroomRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.is_empty() || req.name.len() > 128 {
        return Err(AppError::BadRequest(
            "Chatroom name must be 1-128 characters".to_string(),
        ));
    }
    if req.purpose.len() > 512 {
        return Err(AppError::BadRequest(
            "Chatroom purpose must be at most 512 characters".to_string(),
        ));
    }

    let mut con = redis_con(&state).await?;
    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;

    let room = StoredChatroom {
        id: nanoid::nanoid!(12),
        creator_id: user.id.clone(),
        name: req.name,
        purpose: req.purpose,
        is_active: true,
        created_at: now_secs(),
    };

    storage::chatroom::store_chatroom(&mut con, &room).await?;
    // The creator is a member from the start
    storage::chatroom::add_member(&mut con, &room.id, &user.id).await?;

    tracing::info!(
        action = "chatroom_created",
        chatroom_id = %room.id,
        creator_id = %user.id,
        "Chatroom created"
    );

    Ok((StatusCode::CREATED, Json(room.to_info())))
}

/// GET /api/chatrooms — List chatrooms
pub async fn list_chatrooms(
    _session: AuthSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = redis_con(&state).await?;
    let rooms = storage::chatroom::list_chatrooms(&mut con).await?;
    let infos: Vec<_> = rooms.iter().map(|r| r.to_info()).collect();
    Ok(Json(infos))
}

/// GET /api/chatrooms/:id — Fetch one chatroom
pub async fn get_chatroom(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "chatroom id", 12)?;

    let mut con = redis_con(&state).await?;
    let room = storage::chatroom::get_chatroom(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chatroom not found".to_string()))?;

    Ok(Json(room.to_info()))
}

/// POST /api/chatrooms/:id/join — Join a chatroom
///
/// Allowed iff the room exists and is active. Re-joining as an existing
/// member succeeds without duplicating membership.
pub async fn join_chatroom(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "chatroom id", 12)?;

    let mut con = redis_con(&state).await?;
    let room = storage::chatroom::get_chatroom(&mut con, &id).await?;

    access::can_join_chatroom(room.as_ref()).map_err(|d| d.into_app_error("Chatroom"))?;

    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;
    let newly_added = storage::chatroom::add_member(&mut con, &id, &user.id).await?;

    if newly_added {
        tracing::info!(action = "chatroom_joined", chatroom_id = %id, user_id = %user.id, "User joined chatroom");
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "message": if newly_added {
            "Successfully joined the chatroom"
        } else {
            "Already a member of this chatroom"
        }
    })))
}

/// PATCH /api/chatrooms/:id/close — Close a chatroom (creator only)
///
/// The one legal state transition: active -> closed. Never reversed.
pub async fn close_chatroom(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "chatroom id", 12)?;

    let mut con = redis_con(&state).await?;
    let room = storage::chatroom::get_chatroom(&mut con, &id).await?;
    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;

    access::can_close_chatroom(room.as_ref(), &user.id)
        .map_err(|d| d.into_app_error("Chatroom"))?;

    storage::chatroom::set_chatroom_inactive(&mut con, &id).await?;

    tracing::info!(action = "chatroom_closed", chatroom_id = %id, user_id = %user.id, "Chatroom closed by creator");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Chatroom closed successfully"
    })))
}

/// GET /api/chatrooms/:id/messages — List messages (members only)
///
/// Payloads are stored encoded under the room's scope key and decoded
/// here, inside the authorization boundary.
pub async fn get_messages(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "chatroom id", 12)?;

    let mut con = redis_con(&state).await?;
    storage::chatroom::get_chatroom(&mut con, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Chatroom not found".to_string()))?;

    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;
    if !storage::chatroom::is_member(&mut con, &id, &user.id).await? {
        return Err(AppError::Forbidden(
            "Not a member of this chatroom".to_string(),
        ));
    }

    let limit = query.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT).min(MAX_MESSAGE_LIMIT);
    let stored = storage::chatroom::get_messages(&mut con, &id, query.offset, limit).await?;

    let scope_key = ScopeKey::for_resource(&id);
    let mut messages = Vec::with_capacity(stored.len());
    for m in stored {
        let ciphertext = general_purpose::STANDARD
            .decode(&m.ciphertext)
            .map_err(|e| AppError::Dependency(format!("Corrupt stored message: {}", e)))?;
        let plaintext = state.cipher.decode(&ciphertext, &scope_key);
        messages.push(MessageInfo {
            sender_id: m.sender_id,
            message: String::from_utf8_lossy(&plaintext).into_owned(),
            sent_at: m.sent_at,
        });
    }

    Ok(Json(messages))
}

/// POST /api/chatrooms/:id/messages — Post a message (members only, active room)
pub async fn post_message(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_id(&id, "chatroom id", 12)?;

    if req.message.is_empty() {
        return Err(AppError::BadRequest("Message must not be empty".to_string()));
    }
    if req.message.len() > state.config.max_message_bytes {
        return Err(AppError::BadRequest(format!(
            "Message too large: {} bytes exceeds limit of {} bytes",
            req.message.len(),
            state.config.max_message_bytes
        )));
    }

    let mut con = redis_con(&state).await?;
    let room = storage::chatroom::get_chatroom(&mut con, &id).await?;

    // Posting into a closed room is denied the same way joining is
    access::can_join_chatroom(room.as_ref()).map_err(|d| d.into_app_error("Chatroom"))?;

    let user = registry::resolve_or_create(&mut con, &session.wallet_address).await?;
    if !storage::chatroom::is_member(&mut con, &id, &user.id).await? {
        return Err(AppError::Forbidden(
            "Not a member of this chatroom".to_string(),
        ));
    }

    let scope_key = ScopeKey::for_resource(&id);
    let ciphertext = state.cipher.encode(req.message.as_bytes(), &scope_key);

    let message = StoredMessage {
        sender_id: user.id,
        ciphertext: general_purpose::STANDARD.encode(ciphertext),
        sent_at: now_secs(),
    };

    storage::chatroom::append_message(&mut con, &id, &message).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "success": true }))))
}

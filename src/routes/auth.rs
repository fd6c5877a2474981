//! Auth API endpoints.
//!
//! Login is a linear pipeline: consume the challenge, recover the signer,
//! compare addresses — all pure checks — then a single commit step that
//! resolves the user and mints the session cookie. No error path sets a
//! cookie or mutates state.

use crate::auth::challenge::{build_challenge, normalize_wallet_address};
use crate::auth::middleware::{
    check_rate_limit, clear_session_cookie, session_cookie, AppState, AuthSession,
};
use crate::auth::session::issue_session_token;
use crate::auth::verify::recover_signer;
use crate::error::AppError;
use crate::models::{
    ChallengeRequest, ChallengeResponse, LoginRequest, SessionStatusResponse,
};
use crate::registry;
use crate::storage;
use axum::{
    extract::{ConnectInfo, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// POST /api/auth/challenge — Request a login challenge
///
/// Re-requesting replaces any outstanding challenge for the wallet; at
/// most one is live at a time.
pub async fn request_challenge(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<ChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Rate limit by IP
    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Dependency(format!("Redis connection error: {}", e)))?;

    let rate_limit_key = format!("ratelimit:auth:{}", addr.ip());
    let allowed = check_rate_limit(
        &mut con,
        &rate_limit_key,
        state.config.rate_limit_auth_per_min,
        60,
    )
    .await
    .map_err(|e| AppError::Dependency(format!("Rate limit check failed: {}", e)))?;

    let address = normalize_wallet_address(&req.address)?;

    if req.chain_id == 0 {
        return Err(AppError::BadRequest("Invalid chain id".to_string()));
    }

    if !allowed {
        let mut hasher = std::hash::DefaultHasher::new();
        addr.ip().hash(&mut hasher);
        let ip_hash = format!("{:x}", hasher.finish());
        tracing::warn!(action = "rate_limited", endpoint = "auth/challenge", ip_hash = %ip_hash, "Rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    let challenge = build_challenge(
        &address,
        req.chain_id,
        &state.config.auth_domain,
        state.config.challenge_ttl_secs,
        now_secs(),
    );

    storage::challenge::store_challenge(&mut con, &challenge, state.config.challenge_ttl_secs)
        .await?;

    tracing::debug!(action = "challenge_issued", wallet = %address, chain_id = req.chain_id, "Challenge issued");

    Ok(Json(ChallengeResponse {
        message: challenge.message,
        nonce: challenge.nonce,
        expires_at: challenge.expires_at,
    }))
}

/// POST /api/auth/login — Verify a signed challenge and open a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let address = normalize_wallet_address(&req.address)?;

    let mut con = state
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::Dependency(format!("Redis connection error: {}", e)))?;

    // Consume the challenge first (single-use), keyed on the presented
    // nonce: a replay or a signature over a since-replaced challenge
    // finds nothing to verify against, and a live re-issued challenge
    // survives the failed attempt.
    let challenge = storage::challenge::consume_challenge(&mut con, &address, &req.nonce)
        .await?
        .ok_or(AppError::ChallengeNotFound)?;

    // Storage TTL normally enforces this; the explicit check covers a
    // store without expiry support and clock skew at the boundary.
    if challenge.expires_at < now_secs() {
        return Err(AppError::ChallengeExpired);
    }

    // Recover the signer over the exact bytes that were issued
    let recovered = recover_signer(challenge.message.as_bytes(), &req.signature)?;

    if recovered != address {
        tracing::warn!(action = "auth_failed", wallet = %address, "Signature does not match claimed address");
        return Err(AppError::SignatureInvalid);
    }

    // Commit step: resolve the user, then mint the token. Both complete
    // before the cookie is set, so a session never exists without its
    // user record.
    let user = registry::resolve_or_create(&mut con, &address).await?;

    let token = issue_session_token(
        &address,
        &state.config.session_secret,
        state.config.session_ttl_secs,
    )?;

    tracing::info!(action = "auth_success", wallet = %address, user_id = %user.id, "User authenticated");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, &state.config))],
        Json(serde_json::json!({
            "user": {
                "id": user.id,
                "wallet_address": user.wallet_address,
                "display_name": user.display_name,
            }
        })),
    ))
}

/// GET /api/auth/session — Session probe ("am I logged in?")
pub async fn session_status(
    session: Option<AuthSession>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(match session {
        Some(s) => SessionStatusResponse {
            logged_in: true,
            address: Some(s.wallet_address),
        },
        None => SessionStatusResponse {
            logged_in: false,
            address: None,
        },
    }))
}

/// POST /api/auth/logout — Clear the session cookie
///
/// Advisory revocation: the cookie is cleared on the client, but an
/// already-issued token stays valid until its expiry. Clearing happens
/// even when the cookie is missing or no longer validates, so a client
/// stuck with a stale cookie can always shed it.
pub async fn logout(
    session: Option<AuthSession>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session) = session {
        tracing::info!(action = "logout", wallet = %session.wallet_address, "User logged out");
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(&state.config))],
    ))
}

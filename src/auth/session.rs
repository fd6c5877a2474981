//! Stateless session tokens.
//!
//! A session is an HS256 JWT carrying the authenticated wallet address in
//! the `sub` claim with a 7-day expiry. Validation is a pure function of
//! the token and the server secret: no storage lookup, so authentication
//! keeps working even when the user registry is unreachable.
//!
//! Revocation before expiry is advisory only. Logout clears the client's
//! cookie but cannot invalidate an already-issued token; there is no
//! server-side session store to revoke from. Accepted limitation.

use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims for a session. The wallet address lives in `sub` and only
/// `sub`; no other claim is consulted for identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated wallet address, lowercase hex.
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Mint a session token for a verified wallet address.
pub fn issue_session_token(
    wallet_address: &str,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AppError> {
    let iat = now_secs();
    let claims = SessionClaims {
        sub: wallet_address.to_string(),
        iat,
        exp: iat + ttl_secs,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Dependency(format!("Token encoding failed: {}", e)))
}

/// Validate a session token and extract the wallet address.
///
/// Fails with `SessionExpired` when `exp` has passed and `SessionInvalid`
/// for any other defect (bad signature, malformed payload, wrong shape).
pub fn validate_session_token(token: &str, secret: &str) -> Result<String, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::SessionExpired,
        _ => AppError::SessionInvalid,
    })?;

    Ok(data.claims.sub)
}

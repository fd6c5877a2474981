//! Axum extractors for authentication and rate limiting.

use crate::auth::session::validate_session_token;
use crate::cipher::MessageCipher;
use crate::config::Config;
use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use redis::AsyncCommands;
use std::convert::Infallible;
use std::sync::Arc;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Application state shared across handlers. Constructed once at process
/// start and injected; no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
    /// Message confidentiality strategy; swappable behind the trait.
    pub cipher: Arc<dyn MessageCipher>,
}

/// Build the Set-Cookie value for a freshly issued session token.
///
/// HTTP-only and SameSite=Strict always; Secure per config (off for local
/// development over plain HTTP).
pub fn session_cookie(token: &str, config: &Config) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, config.session_ttl_secs
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the Set-Cookie value that clears the session cookie on logout.
pub fn clear_session_cookie(config: &Config) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    );
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Pull the session token out of the Cookie header, if present.
pub fn extract_session_token(parts: &Parts) -> Option<String> {
    let header = parts.headers.get("cookie")?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(String::from)
    })
}

/// Authenticated session extractor.
///
/// Extracts the session cookie and validates the JWT. Validation is pure
/// (token + server secret); no storage access happens here, so requests
/// authenticate even when Redis is degraded. Handlers that need a user id
/// resolve it through the registry afterwards.
///
/// Returns 401 Unauthorized if the cookie is missing, expired, or invalid.
pub struct AuthSession {
    /// Authenticated wallet address, lowercase hex.
    pub wallet_address: String,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(parts).ok_or(AppError::SessionInvalid)?;

        let wallet_address = validate_session_token(&token, &state.config.session_secret)?;

        Ok(AuthSession { wallet_address })
    }
}

/// Optional variant: `Option<AuthSession>` extracts to `Some` when a valid
/// session cookie is present, `None` otherwise, without failing the request.
impl OptionalFromRequestParts<AppState> for AuthSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(parts, state)
                .await
                .ok(),
        )
    }
}

/// Check rate limit using Redis INCR with TTL.
///
/// # Arguments
/// * `con` - Redis connection
/// * `key` - Rate limit key (e.g., "ratelimit:auth:127.0.0.1")
/// * `max` - Maximum requests allowed in window
/// * `window_secs` - Time window in seconds
///
/// # Returns
/// * `Ok(true)` if under limit
/// * `Ok(false)` if limit exceeded
pub async fn check_rate_limit<C>(
    con: &mut C,
    key: &str,
    max: u32,
    window_secs: u64,
) -> Result<bool, redis::RedisError>
where
    C: AsyncCommands,
{
    // Increment counter
    let count: u32 = con.incr(key, 1).await?;

    // Set TTL on first request
    if count == 1 {
        con.expire::<_, ()>(key, window_secs as i64).await?;
    }

    Ok(count <= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::issue_session_token;
    use axum::http::Request;

    fn test_config() -> Config {
        Config {
            session_secret: "unit-test-secret-unit-test-secret!".to_string(),
            auth_domain: "localhost:3000".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            challenge_ttl_secs: 300,
            session_ttl_secs: 604_800,
            cookie_secure: false,
            max_message_bytes: 8192,
            rate_limit_auth_per_min: 5,
        }
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let (parts, _) = Request::builder()
            .uri("/")
            .header("cookie", cookie)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut config = test_config();
        let cookie = session_cookie("tok123", &config);
        assert!(cookie.starts_with("session=tok123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));

        config.cookie_secure = true;
        assert!(session_cookie("tok123", &config).contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_zeroes_max_age() {
        let cookie = clear_session_cookie(&test_config());
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_session_token() {
        let parts = parts_with_cookie("theme=dark; session=abc.def.ghi; lang=en");
        assert_eq!(extract_session_token(&parts).as_deref(), Some("abc.def.ghi"));

        let parts = parts_with_cookie("theme=dark");
        assert_eq!(extract_session_token(&parts), None);

        // A cookie merely prefixed with the session name must not match
        let parts = parts_with_cookie("sessionx=abc");
        assert_eq!(extract_session_token(&parts), None);
    }

    #[tokio::test]
    async fn test_auth_session_round_trip() {
        let config = test_config();
        let state = AppState {
            redis: redis::Client::open(config.redis_url.as_str()).unwrap(),
            config: Arc::new(config),
            cipher: Arc::new(crate::cipher::XorCipher),
        };

        let wallet = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";
        let token =
            issue_session_token(wallet, &state.config.session_secret, 604_800).unwrap();
        let mut parts = parts_with_cookie(&format!("session={}", token));

        let session =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
        assert_eq!(session.wallet_address, wallet);
    }

    #[tokio::test]
    async fn test_missing_cookie_rejected() {
        let config = test_config();
        let state = AppState {
            redis: redis::Client::open(config.redis_url.as_str()).unwrap(),
            config: Arc::new(config),
            cipher: Arc::new(crate::cipher::XorCipher),
        };

        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        let result =
            <AuthSession as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
                .await;
        assert!(matches!(result, Err(AppError::SessionInvalid)));

        // Optional extractor swallows the failure
        let opt = Option::<AuthSession>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(opt.is_none());
    }
}

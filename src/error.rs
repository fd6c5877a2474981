//! Error types and Axum response conversions.
//!
//! The auth variants map the protocol failure modes onto HTTP statuses:
//! challenge and session failures are all 401 (the client restarts the
//! login flow), Forbidden is authenticated-but-not-authorized and is
//! returned verbatim, NotFound is distinct from Forbidden (existence
//! leakage is acceptable here). Collaborator failures surface as a
//! generic 500 with details logged server-side only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Challenge not found")]
    ChallengeNotFound,

    #[error("Challenge expired")]
    ChallengeExpired,

    #[error("Invalid signature")]
    SignatureInvalid,

    #[error("Invalid session")]
    SessionInvalid,

    #[error("Session expired")]
    SessionExpired,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Dependency failure: {0}")]
    Dependency(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ChallengeNotFound => {
                (StatusCode::UNAUTHORIZED, "Challenge not found or expired".to_string())
            }
            AppError::ChallengeExpired => {
                (StatusCode::UNAUTHORIZED, "Challenge expired".to_string())
            }
            AppError::SignatureInvalid => {
                (StatusCode::UNAUTHORIZED, "Invalid signature".to_string())
            }
            // Invalid and expired sessions are both "not authenticated";
            // the client re-logs-in either way.
            AppError::SessionInvalid | AppError::SessionExpired => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded".to_string(),
            ),
            AppError::Dependency(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Dependency failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// Convenience conversions from common error types
impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Dependency(format!("Redis error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Dependency(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AppError response.
    async fn error_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_dependency_hides_details() {
        // CRITICAL: dependency errors must NOT leak detailed message to client
        let (status, body) = error_response(AppError::Dependency(
            "Redis connection refused at 10.0.0.5:6379".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        // Must NOT contain the actual error details
        assert!(!body["error"].as_str().unwrap().contains("Redis"));
        assert!(!body["error"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_challenge_not_found_is_401() {
        let (status, body) = error_response(AppError::ChallengeNotFound).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Challenge not found or expired");
    }

    #[tokio::test]
    async fn test_signature_invalid_is_401() {
        let (status, body) = error_response(AppError::SignatureInvalid).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid signature");
    }

    #[tokio::test]
    async fn test_session_errors_look_identical() {
        // Expired and invalid sessions must be indistinguishable to callers
        let (status_a, body_a) = error_response(AppError::SessionInvalid).await;
        let (status_b, body_b) = error_response(AppError::SessionExpired).await;
        assert_eq!(status_a, StatusCode::UNAUTHORIZED);
        assert_eq!(status_a, status_b);
        assert_eq!(body_a, body_b);
    }

    #[tokio::test]
    async fn test_forbidden() {
        let (status, body) = error_response(AppError::Forbidden(
            "Only the creator can close this chatroom".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Only the creator can close this chatroom");
    }

    #[tokio::test]
    async fn test_not_found() {
        let (status, body) =
            error_response(AppError::NotFound("Chatroom not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Chatroom not found");
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (status, body) = error_response(AppError::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Rate limit exceeded");
    }

    #[test]
    fn test_from_redis_error() {
        let redis_err = redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "test context",
            "connection refused".to_string(),
        ));
        let app_err = AppError::from(redis_err);
        match app_err {
            AppError::Dependency(msg) => assert!(msg.contains("Redis error")),
            _ => panic!("Expected Dependency variant"),
        }
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let app_err = AppError::from(serde_err);
        match app_err {
            AppError::Dependency(msg) => assert!(msg.contains("JSON error")),
            _ => panic!("Expected Dependency variant"),
        }
    }
}

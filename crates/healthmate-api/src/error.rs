//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.
//! Upstream generation failures and storage errors are reported with short
//! generic messages; the detail is logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use healthmate_chat::ChatError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid body fields.
    BadRequest(String),
    /// 404 Not Found - resource does not exist for this owner.
    NotFound(String),
    /// 500 Internal Server Error - generation or persistence failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            ChatError::ConversationNotFound(_) => {
                ApiError::NotFound("Conversation not found".to_string())
            }
            ChatError::Llm(detail) => {
                tracing::error!(detail = %detail, "Generation failed");
                ApiError::Internal("Generation failed".to_string())
            }
            ChatError::Storage(detail) => {
                tracing::error!(detail = %detail, "Storage error");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<healthmate_core::error::HealthmateError> for ApiError {
    fn from(err: healthmate_core::error::HealthmateError) -> Self {
        tracing::error!(detail = %err, "Storage error");
        ApiError::Internal("Internal server error".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_hides_conversation_id() {
        let err: ApiError = ChatError::ConversationNotFound(uuid::Uuid::new_v4()).into();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Conversation not found"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_llm_failure_maps_to_generic_internal() {
        let err: ApiError = ChatError::Llm("api key rejected by upstream".to_string()).into();
        match err {
            ApiError::Internal(msg) => {
                assert_eq!(msg, "Generation failed");
                assert!(!msg.contains("api key"));
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_empty_message_maps_to_bad_request() {
        let err: ApiError = ChatError::EmptyMessage.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}

//! Error types for the conversation service.

use healthmate_core::error::HealthmateError;
use healthmate_gateway::GatewayError;

/// Errors from the conversation service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is required and must be a string")]
    EmptyMessage,
    #[error("conversation not found: {0}")]
    ConversationNotFound(uuid::Uuid),
    #[error("generation failed: {0}")]
    Llm(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<HealthmateError> for ChatError {
    fn from(err: HealthmateError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<GatewayError> for ChatError {
    fn from(err: GatewayError) -> Self {
        ChatError::Llm(err.to_string())
    }
}

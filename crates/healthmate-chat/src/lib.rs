//! Conversation service for HealthMate.
//!
//! Orchestrates one chat turn: redact the incoming user text, assemble the
//! trailing context window, call the generation gateway, append the
//! user/assistant pair, and persist.

pub mod error;
pub mod service;
pub mod title;

pub use error::ChatError;
pub use service::ConversationService;
pub use title::derive_title;

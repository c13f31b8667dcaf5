//! Application state shared across all route handlers.
//!
//! AppState holds references to the conversation service and shared
//! resources. It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use healthmate_chat::ConversationService;
use healthmate_core::config::HealthmateConfig;
use healthmate_gateway::LlmClient;
use healthmate_storage::{ConversationRepository, Database, ReminderRepository};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<HealthmateConfig>,
    /// SQLite database for persistent storage.
    pub database: Arc<Database>,
    /// Conversation service (redaction, context assembly, generation).
    pub chat: Arc<ConversationService>,
    /// Conversation store, used directly for dashboard aggregates.
    pub conversations: Arc<ConversationRepository>,
    /// Reminder store.
    pub reminders: Arc<ReminderRepository>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState over the given database and generation client.
    pub fn new(config: HealthmateConfig, database: Database, llm: Arc<dyn LlmClient>) -> Self {
        let database = Arc::new(database);
        let chat = ConversationService::new(
            Arc::clone(&database),
            llm,
            config.chat.clone(),
            config.safety.clone(),
        );
        let conversations = ConversationRepository::new(Arc::clone(&database));
        let reminders = ReminderRepository::new(Arc::clone(&database));
        Self {
            config: Arc::new(config),
            database,
            chat: Arc::new(chat),
            conversations: Arc::new(conversations),
            reminders: Arc::new(reminders),
            start_time: Instant::now(),
        }
    }
}

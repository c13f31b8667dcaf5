//! Conversation service: the central coordinator for chat turns.
//!
//! One turn runs redact -> assemble context -> generate -> append pair ->
//! persist. A failed generation aborts the whole operation: the tentative
//! user turn is never stored, so a persisted conversation always holds an
//! even, non-zero number of messages.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use healthmate_core::config::{ChatConfig, SafetyConfig};
use healthmate_core::types::{Conversation, ConversationSummary, Message, Role};
use healthmate_core::Redactor;
use healthmate_gateway::{build_prompt, Domain, LlmClient, PromptOptions, Task};
use healthmate_storage::{ConversationRepository, Database};

use crate::error::ChatError;
use crate::title::derive_title;

/// Coordinates the redactor, the conversation store, and the generation
/// gateway.
pub struct ConversationService {
    repo: ConversationRepository,
    llm: Arc<dyn LlmClient>,
    redactor: Redactor,
    config: ChatConfig,
    domain: Domain,
}

impl ConversationService {
    /// Create a new service over the given database and generation client.
    pub fn new(
        db: Arc<Database>,
        llm: Arc<dyn LlmClient>,
        config: ChatConfig,
        safety: SafetyConfig,
    ) -> Self {
        let domain = Domain::from_config(&config.domain);
        Self {
            repo: ConversationRepository::new(db),
            llm,
            redactor: Redactor::new(safety),
            config,
            domain,
        }
    }

    /// Start a new conversation from the first user message.
    ///
    /// Redacts, generates with an empty context window, derives the title
    /// from the redacted text, and persists exactly one user/assistant pair.
    pub async fn start_conversation(
        &self,
        user_id: &str,
        raw_message: &str,
    ) -> Result<Conversation, ChatError> {
        if raw_message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let safe_message = self.redactor.redact(raw_message);
        let prompt = build_prompt(&safe_message, &[], &self.options(None));
        let reply = self.generate(user_id, None, &prompt).await?;

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: derive_title(
                &safe_message,
                &self.config.title_prefix,
                self.config.title_max_chars,
            ),
            messages: vec![
                Message::new(Role::User, safe_message, now),
                Message::new(Role::Assistant, reply, now),
            ],
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&conversation)?;

        info!(
            conversation_id = %conversation.id,
            user_id = %user_id,
            "Conversation started"
        );
        Ok(conversation)
    }

    /// Append one user/assistant pair to an existing conversation.
    ///
    /// The context window is the trailing slice of stored messages taken
    /// before the new pair is appended. A gateway failure leaves the
    /// conversation unmodified.
    pub async fn continue_conversation(
        &self,
        user_id: &str,
        conversation_id: Uuid,
        raw_message: &str,
    ) -> Result<Conversation, ChatError> {
        if raw_message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let conversation = self
            .repo
            .find_by_id(user_id, conversation_id)?
            .ok_or(ChatError::ConversationNotFound(conversation_id))?;

        let context = conversation.context_window(self.config.context_messages);
        let safe_message = self.redactor.redact(raw_message);
        let prompt = build_prompt(&safe_message, context, &self.options(None));
        let reply = self
            .generate(user_id, Some(conversation_id), &prompt)
            .await?;

        let now = Utc::now();
        let updated = self
            .repo
            .append_pair(
                user_id,
                conversation_id,
                &Message::new(Role::User, safe_message, now),
                &Message::new(Role::Assistant, reply, now),
                now,
            )?
            .ok_or(ChatError::ConversationNotFound(conversation_id))?;

        info!(
            conversation_id = %conversation_id,
            user_id = %user_id,
            messages = updated.messages.len(),
            "Conversation continued"
        );
        Ok(updated)
    }

    /// Fetch a full conversation, owner-scoped.
    pub fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: Uuid,
    ) -> Result<Conversation, ChatError> {
        self.repo
            .find_by_id(user_id, conversation_id)?
            .ok_or(ChatError::ConversationNotFound(conversation_id))
    }

    /// List a user's conversations, newest-updated first.
    pub fn list_conversations(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.repo.list_summaries(user_id)?)
    }

    /// Delete a conversation. Idempotent: an absent or already-deleted id
    /// succeeds without error.
    pub fn delete_conversation(
        &self,
        user_id: &str,
        conversation_id: Uuid,
    ) -> Result<(), ChatError> {
        self.repo.delete(user_id, conversation_id)?;
        info!(
            conversation_id = %conversation_id,
            user_id = %user_id,
            "Conversation deleted"
        );
        Ok(())
    }

    /// One-off symptom triage: redact, generate with the triage task
    /// directive and a caller-supplied context, persist nothing.
    pub async fn symptom_check(
        &self,
        description: &str,
        context: &[Message],
    ) -> Result<String, ChatError> {
        if description.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let safe = self.redactor.redact(description);
        let prompt = build_prompt(&safe, context, &self.options(Some(Task::SymptomCheck)));
        Ok(self.llm.generate(&prompt).await?)
    }

    fn options(&self, task: Option<Task>) -> PromptOptions {
        PromptOptions {
            domain: self.domain,
            task,
        }
    }

    async fn generate(
        &self,
        user_id: &str,
        conversation_id: Option<Uuid>,
        prompt: &str,
    ) -> Result<String, ChatError> {
        match self.llm.generate(prompt).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    conversation_id = ?conversation_id,
                    error = %e,
                    "Generation call failed"
                );
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Domain types shared across the HealthMate crates.
//!
//! Wire-facing structs serialize with camelCase field names to match the
//! JSON surface of the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a message turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lowercase wire form, also used as the database value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized label used when rendering prompt lines.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }

    /// Parse a wire role string. Anything other than "user" is treated as
    /// an assistant turn.
    pub fn from_wire(s: &str) -> Self {
        if s == "user" {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// A single immutable message turn inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    /// Message text. Already redacted for user-authored turns.
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
        }
    }
}

/// A persisted conversation: an append-only list of user/assistant pairs
/// plus metadata.
///
/// Invariant: once persisted, `messages` has an even, non-zero length and
/// strictly alternating roles starting with a user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    /// Derived once from the first redacted user message, never recomputed.
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// The trailing slice of at most `max` messages, used as generation
    /// context. Chronological order is preserved.
    pub fn context_window(&self, max: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(max);
        &self.messages[start..]
    }
}

/// Listing view of a conversation: identity and timestamps only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reminder repetition schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    pub fn from_wire(s: &str) -> Self {
        if s == "weekly" {
            Frequency::Weekly
        } else {
            Frequency::Daily
        }
    }
}

/// A stored reminder record.
///
/// Inert data: nothing in this system fires reminders or delivers
/// notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub notes: String,
    /// Local wall-clock time, e.g. "20:00".
    pub time_of_day: String,
    pub frequency: Frequency,
    /// Weekday 0-6 (0 = Sunday), only meaningful for weekly reminders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekday: Option<u8>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

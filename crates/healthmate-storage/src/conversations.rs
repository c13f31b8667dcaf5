//! SQLite-backed persistence for conversations and their messages.
//!
//! Messages live in their own table keyed by `(conversation_id, seq)`; the
//! user/assistant pair of a turn is written in a single transaction together
//! with the `updated_at` refresh, so a conversation can never persist a
//! partial pair and concurrent appends interleave without loss.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use healthmate_core::error::HealthmateError;
use healthmate_core::types::{Conversation, ConversationSummary, Message, Role};

use crate::db::Database;

/// Repository for conversation records.
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist a newly created conversation together with its initial
    /// messages, atomically.
    pub fn insert(&self, conversation: &Conversation) -> Result<(), HealthmateError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            tx.execute(
                "INSERT INTO conversations (id, user_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    conversation.id.to_string(),
                    conversation.user_id,
                    conversation.title,
                    conversation.created_at.timestamp_millis(),
                    conversation.updated_at.timestamp_millis(),
                ],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to insert conversation: {}", e)))?;

            for (seq, message) in conversation.messages.iter().enumerate() {
                insert_message(&tx, conversation.id, seq as i64, message)?;
            }

            tx.commit()
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            Ok(())
        })
    }

    /// Load a conversation with its full ordered message list.
    ///
    /// Returns `None` when no conversation with that id exists for that
    /// owner.
    pub fn find_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Conversation>, HealthmateError> {
        self.db.with_conn(|conn| load_conversation(conn, user_id, id))
    }

    /// List a user's conversations, newest-updated first, without messages.
    pub fn list_summaries(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConversationSummary>, HealthmateError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, created_at, updated_at
                     FROM conversations
                     WHERE user_id = ?1
                     ORDER BY updated_at DESC, created_at DESC",
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id], |row| {
                    let id: String = row.get(0)?;
                    let title: String = row.get(1)?;
                    let created_at: i64 = row.get(2)?;
                    let updated_at: i64 = row.get(3)?;
                    Ok((id, title, created_at, updated_at))
                })
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            let mut summaries = Vec::new();
            for row in rows {
                let (id, title, created_at, updated_at) =
                    row.map_err(|e| HealthmateError::Storage(e.to_string()))?;
                summaries.push(ConversationSummary {
                    id: parse_uuid(&id)?,
                    title,
                    created_at: millis_to_datetime(created_at),
                    updated_at: millis_to_datetime(updated_at),
                });
            }
            Ok(summaries)
        })
    }

    /// Append a user/assistant pair and refresh `updated_at`, atomically.
    ///
    /// The sequence numbers are assigned from `MAX(seq)` inside the
    /// transaction, so two concurrent appends to the same conversation both
    /// survive in chronological commit order. Returns the updated
    /// conversation, or `None` when it does not exist for that owner.
    pub fn append_pair(
        &self,
        user_id: &str,
        id: Uuid,
        user_message: &Message,
        assistant_message: &Message,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Conversation>, HealthmateError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            let owned: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM conversations WHERE id = ?1 AND user_id = ?2",
                    rusqlite::params![id.to_string(), user_id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            if owned.is_none() {
                return Ok(None);
            }

            let next_seq: i64 = tx
                .query_row(
                    "SELECT COALESCE(MAX(seq), -1) + 1 FROM messages WHERE conversation_id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            insert_message(&tx, id, next_seq, user_message)?;
            insert_message(&tx, id, next_seq + 1, assistant_message)?;

            tx.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                rusqlite::params![updated_at.timestamp_millis(), id.to_string()],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to touch conversation: {}", e)))?;

            tx.commit()
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            load_conversation(conn, user_id, id)
        })
    }

    /// Delete a conversation and its messages. Idempotent: deleting an
    /// absent or already-deleted id succeeds.
    pub fn delete(&self, user_id: &str, id: Uuid) -> Result<(), HealthmateError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM conversations WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id.to_string(), user_id],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to delete conversation: {}", e)))?;
            Ok(())
        })
    }

    /// Count a user's conversations.
    pub fn count(&self, user_id: &str) -> Result<u64, HealthmateError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM conversations WHERE user_id = ?1",
                    rusqlite::params![user_id],
                    |row| row.get(0),
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Count all messages across a user's conversations.
    pub fn message_count(&self, user_id: &str) -> Result<u64, HealthmateError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*)
                     FROM messages m
                     JOIN conversations c ON c.id = m.conversation_id
                     WHERE c.user_id = ?1",
                    rusqlite::params![user_id],
                    |row| row.get(0),
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

fn insert_message(
    conn: &Connection,
    conversation_id: Uuid,
    seq: i64,
    message: &Message,
) -> Result<(), HealthmateError> {
    conn.execute(
        "INSERT INTO messages (id, conversation_id, seq, role, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            Uuid::new_v4().to_string(),
            conversation_id.to_string(),
            seq,
            message.role.as_str(),
            message.content,
            message.created_at.timestamp_millis(),
        ],
    )
    .map_err(|e| HealthmateError::Storage(format!("Failed to insert message: {}", e)))?;
    Ok(())
}

fn load_conversation(
    conn: &Connection,
    user_id: &str,
    id: Uuid,
) -> Result<Option<Conversation>, HealthmateError> {
    let header: Option<(String, i64, i64)> = conn
        .query_row(
            "SELECT title, created_at, updated_at
             FROM conversations WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id.to_string(), user_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
        .map_err(|e| HealthmateError::Storage(e.to_string()))?;

    let Some((title, created_at, updated_at)) = header else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare(
            "SELECT role, content, created_at
             FROM messages WHERE conversation_id = ?1
             ORDER BY seq ASC",
        )
        .map_err(|e| HealthmateError::Storage(e.to_string()))?;

    let rows = stmt
        .query_map(rusqlite::params![id.to_string()], |row| {
            let role: String = row.get(0)?;
            let content: String = row.get(1)?;
            let created_at: i64 = row.get(2)?;
            Ok((role, content, created_at))
        })
        .map_err(|e| HealthmateError::Storage(e.to_string()))?;

    let mut messages = Vec::new();
    for row in rows {
        let (role, content, created_at) =
            row.map_err(|e| HealthmateError::Storage(e.to_string()))?;
        messages.push(Message {
            role: Role::from_wire(&role),
            content,
            created_at: millis_to_datetime(created_at),
        });
    }

    Ok(Some(Conversation {
        id,
        user_id: user_id.to_string(),
        title,
        messages,
        created_at: millis_to_datetime(created_at),
        updated_at: millis_to_datetime(updated_at),
    }))
}

fn parse_uuid(s: &str) -> Result<Uuid, HealthmateError> {
    Uuid::parse_str(s)
        .map_err(|e| HealthmateError::Storage(format!("Invalid UUID in database: {}", e)))
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> ConversationRepository {
        ConversationRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn sample_conversation(user_id: &str, at: DateTime<Utc>) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: "Health: sample".to_string(),
            messages: vec![
                Message::new(Role::User, "hello", at),
                Message::new(Role::Assistant, "hi there", at),
            ],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = repo();
        let conv = sample_conversation("u1", Utc::now());
        repo.insert(&conv).unwrap();

        let loaded = repo.find_by_id("u1", conv.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Health: sample");
        assert_eq!(loaded.messages.len(), 2);
        assert_eq!(loaded.messages[0].role, Role::User);
        assert_eq!(loaded.messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_find_wrong_owner_returns_none() {
        let repo = repo();
        let conv = sample_conversation("u1", Utc::now());
        repo.insert(&conv).unwrap();
        assert!(repo.find_by_id("u2", conv.id).unwrap().is_none());
    }

    #[test]
    fn test_find_unknown_id_returns_none() {
        let repo = repo();
        assert!(repo.find_by_id("u1", Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_append_pair_preserves_order() {
        let repo = repo();
        let start = Utc::now();
        let conv = sample_conversation("u1", start);
        repo.insert(&conv).unwrap();

        let later = start + Duration::seconds(5);
        let updated = repo
            .append_pair(
                "u1",
                conv.id,
                &Message::new(Role::User, "second question", later),
                &Message::new(Role::Assistant, "second answer", later),
                later,
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.messages.len(), 4);
        assert_eq!(updated.messages[2].content, "second question");
        assert_eq!(updated.messages[3].content, "second answer");
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn test_append_pair_unknown_conversation() {
        let repo = repo();
        let now = Utc::now();
        let result = repo
            .append_pair(
                "u1",
                Uuid::new_v4(),
                &Message::new(Role::User, "x", now),
                &Message::new(Role::Assistant, "y", now),
                now,
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_append_pair_wrong_owner() {
        let repo = repo();
        let now = Utc::now();
        let conv = sample_conversation("u1", now);
        repo.insert(&conv).unwrap();

        let result = repo
            .append_pair(
                "intruder",
                conv.id,
                &Message::new(Role::User, "x", now),
                &Message::new(Role::Assistant, "y", now),
                now,
            )
            .unwrap();
        assert!(result.is_none());
        // The real owner's record is untouched.
        let loaded = repo.find_by_id("u1", conv.id).unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
    }

    #[test]
    fn test_list_summaries_newest_first() {
        let repo = repo();
        let base = Utc::now();
        let oldest = sample_conversation("u1", base - Duration::minutes(10));
        let middle = sample_conversation("u1", base - Duration::minutes(5));
        let newest = sample_conversation("u1", base);
        repo.insert(&oldest).unwrap();
        repo.insert(&newest).unwrap();
        repo.insert(&middle).unwrap();

        let summaries = repo.list_summaries("u1").unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].id, newest.id);
        assert_eq!(summaries[1].id, middle.id);
        assert_eq!(summaries[2].id, oldest.id);
    }

    #[test]
    fn test_list_summaries_scoped_to_owner() {
        let repo = repo();
        repo.insert(&sample_conversation("u1", Utc::now())).unwrap();
        repo.insert(&sample_conversation("u2", Utc::now())).unwrap();
        assert_eq!(repo.list_summaries("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let repo = repo();
        let conv = sample_conversation("u1", Utc::now());
        repo.insert(&conv).unwrap();

        repo.delete("u1", conv.id).unwrap();
        repo.delete("u1", conv.id).unwrap();
        assert!(repo.find_by_id("u1", conv.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_scoped_to_owner() {
        let repo = repo();
        let conv = sample_conversation("u1", Utc::now());
        repo.insert(&conv).unwrap();

        repo.delete("u2", conv.id).unwrap();
        assert!(repo.find_by_id("u1", conv.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_removes_messages() {
        let repo = repo();
        let conv = sample_conversation("u1", Utc::now());
        repo.insert(&conv).unwrap();
        repo.delete("u1", conv.id).unwrap();

        let orphaned: i64 = repo
            .db
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
                    rusqlite::params![conv.id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))
            })
            .unwrap();
        assert_eq!(orphaned, 0);
    }

    #[test]
    fn test_count_scoped_to_owner() {
        let repo = repo();
        assert_eq!(repo.count("u1").unwrap(), 0);
        repo.insert(&sample_conversation("u1", Utc::now())).unwrap();
        repo.insert(&sample_conversation("u1", Utc::now())).unwrap();
        repo.insert(&sample_conversation("u2", Utc::now())).unwrap();
        assert_eq!(repo.count("u1").unwrap(), 2);
    }

    #[test]
    fn test_message_count_sums_across_conversations() {
        let repo = repo();
        let now = Utc::now();
        assert_eq!(repo.message_count("u1").unwrap(), 0);

        let conv = sample_conversation("u1", now);
        repo.insert(&conv).unwrap();
        repo.insert(&sample_conversation("u1", now)).unwrap();
        repo.insert(&sample_conversation("u2", now)).unwrap();
        repo.append_pair(
            "u1",
            conv.id,
            &Message::new(Role::User, "more", now),
            &Message::new(Role::Assistant, "reply", now),
            now,
        )
        .unwrap();

        // Two conversations of 2 messages each, one grown to 4.
        assert_eq!(repo.message_count("u1").unwrap(), 6);
        assert_eq!(repo.message_count("u2").unwrap(), 2);
    }
}

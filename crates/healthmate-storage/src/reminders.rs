//! SQLite-backed persistence for reminder records.
//!
//! Reminders are inert data: stored, listed, edited, deleted. No scheduler
//! reads them and nothing fires notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use healthmate_core::error::HealthmateError;
use healthmate_core::types::{Frequency, Reminder};

use crate::db::Database;

/// Partial update applied to an existing reminder. `None` fields are left
/// unchanged.
#[derive(Debug, Default, Clone)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub time_of_day: Option<String>,
    pub frequency: Option<Frequency>,
    pub weekday: Option<u8>,
    pub is_active: Option<bool>,
}

/// Repository for reminder records.
pub struct ReminderRepository {
    db: Arc<Database>,
}

impl ReminderRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new reminder.
    pub fn insert(&self, reminder: &Reminder) -> Result<(), HealthmateError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reminders
                 (id, user_id, title, notes, time_of_day, frequency, weekday, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    reminder.id.to_string(),
                    reminder.user_id,
                    reminder.title,
                    reminder.notes,
                    reminder.time_of_day,
                    reminder.frequency.as_str(),
                    reminder.weekday,
                    reminder.is_active as i32,
                    reminder.created_at.timestamp_millis(),
                    reminder.updated_at.timestamp_millis(),
                ],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to insert reminder: {}", e)))?;
            Ok(())
        })
    }

    /// List a user's reminders, newest-updated first.
    pub fn list(&self, user_id: &str) -> Result<Vec<Reminder>, HealthmateError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, user_id, title, notes, time_of_day, frequency, weekday, is_active, created_at, updated_at
                     FROM reminders WHERE user_id = ?1
                     ORDER BY updated_at DESC, created_at DESC",
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id], row_to_reminder)
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;

            let mut reminders = Vec::new();
            for row in rows {
                reminders.push(row.map_err(|e| HealthmateError::Storage(e.to_string()))?);
            }
            Ok(reminders)
        })
    }

    /// Find a reminder by id, owner-scoped.
    pub fn find_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<Reminder>, HealthmateError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user_id, title, notes, time_of_day, frequency, weekday, is_active, created_at, updated_at
                 FROM reminders WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id.to_string(), user_id],
                row_to_reminder,
            )
            .optional()
            .map_err(|e| HealthmateError::Storage(e.to_string()))
        })
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// Returns the updated reminder, or `None` when it does not exist for
    /// that owner.
    pub fn update(
        &self,
        user_id: &str,
        id: Uuid,
        update: &ReminderUpdate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Reminder>, HealthmateError> {
        let Some(mut reminder) = self.find_by_id(user_id, id)? else {
            return Ok(None);
        };

        if let Some(title) = &update.title {
            reminder.title = title.clone();
        }
        if let Some(notes) = &update.notes {
            reminder.notes = notes.clone();
        }
        if let Some(time_of_day) = &update.time_of_day {
            reminder.time_of_day = time_of_day.clone();
        }
        if let Some(frequency) = update.frequency {
            reminder.frequency = frequency;
        }
        if let Some(weekday) = update.weekday {
            reminder.weekday = Some(weekday);
        }
        if let Some(is_active) = update.is_active {
            reminder.is_active = is_active;
        }
        reminder.updated_at = updated_at;

        self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE reminders
                 SET title = ?1, notes = ?2, time_of_day = ?3, frequency = ?4,
                     weekday = ?5, is_active = ?6, updated_at = ?7
                 WHERE id = ?8 AND user_id = ?9",
                rusqlite::params![
                    reminder.title,
                    reminder.notes,
                    reminder.time_of_day,
                    reminder.frequency.as_str(),
                    reminder.weekday,
                    reminder.is_active as i32,
                    reminder.updated_at.timestamp_millis(),
                    id.to_string(),
                    user_id,
                ],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to update reminder: {}", e)))?;
            Ok(())
        })?;

        Ok(Some(reminder))
    }

    /// Delete a reminder. Idempotent and owner-scoped.
    pub fn delete(&self, user_id: &str, id: Uuid) -> Result<(), HealthmateError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM reminders WHERE id = ?1 AND user_id = ?2",
                rusqlite::params![id.to_string(), user_id],
            )
            .map_err(|e| HealthmateError::Storage(format!("Failed to delete reminder: {}", e)))?;
            Ok(())
        })
    }
}

fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let frequency: String = row.get(5)?;
    let is_active: i64 = row.get(7)?;
    let created_at: i64 = row.get(8)?;
    let updated_at: i64 = row.get(9)?;
    Ok(Reminder {
        id,
        user_id: row.get(1)?,
        title: row.get(2)?,
        notes: row.get(3)?,
        time_of_day: row.get(4)?,
        frequency: Frequency::from_wire(&frequency),
        weekday: row.get(6)?,
        is_active: is_active != 0,
        created_at: DateTime::<Utc>::from_timestamp_millis(created_at).unwrap_or_default(),
        updated_at: DateTime::<Utc>::from_timestamp_millis(updated_at).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn repo() -> ReminderRepository {
        ReminderRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn sample_reminder(user_id: &str, title: &str, at: DateTime<Utc>) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            notes: String::new(),
            time_of_day: "20:00".to_string(),
            frequency: Frequency::Daily,
            weekday: None,
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_insert_and_list() {
        let repo = repo();
        let now = Utc::now();
        repo.insert(&sample_reminder("u1", "Take vitamins", now))
            .unwrap();

        let reminders = repo.list("u1").unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Take vitamins");
        assert!(reminders[0].is_active);
    }

    #[test]
    fn test_list_newest_updated_first() {
        let repo = repo();
        let base = Utc::now();
        let old = sample_reminder("u1", "old", base - Duration::minutes(5));
        let new = sample_reminder("u1", "new", base);
        repo.insert(&old).unwrap();
        repo.insert(&new).unwrap();

        let reminders = repo.list("u1").unwrap();
        assert_eq!(reminders[0].title, "new");
        assert_eq!(reminders[1].title, "old");
    }

    #[test]
    fn test_list_scoped_to_owner() {
        let repo = repo();
        let now = Utc::now();
        repo.insert(&sample_reminder("u1", "mine", now)).unwrap();
        repo.insert(&sample_reminder("u2", "theirs", now)).unwrap();
        assert_eq!(repo.list("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_update_partial_fields() {
        let repo = repo();
        let now = Utc::now();
        let reminder = sample_reminder("u1", "Walk", now);
        repo.insert(&reminder).unwrap();

        let update = ReminderUpdate {
            notes: Some("30 minutes".to_string()),
            is_active: Some(false),
            ..ReminderUpdate::default()
        };
        let later = now + Duration::seconds(10);
        let updated = repo
            .update("u1", reminder.id, &update, later)
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Walk");
        assert_eq!(updated.notes, "30 minutes");
        assert!(!updated.is_active);
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn test_update_frequency_and_weekday() {
        let repo = repo();
        let now = Utc::now();
        let reminder = sample_reminder("u1", "Weigh in", now);
        repo.insert(&reminder).unwrap();

        let update = ReminderUpdate {
            frequency: Some(Frequency::Weekly),
            weekday: Some(0),
            ..ReminderUpdate::default()
        };
        let updated = repo
            .update("u1", reminder.id, &update, now)
            .unwrap()
            .unwrap();
        assert_eq!(updated.frequency, Frequency::Weekly);
        assert_eq!(updated.weekday, Some(0));
    }

    #[test]
    fn test_update_unknown_returns_none() {
        let repo = repo();
        let result = repo
            .update("u1", Uuid::new_v4(), &ReminderUpdate::default(), Utc::now())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_update_wrong_owner_returns_none() {
        let repo = repo();
        let now = Utc::now();
        let reminder = sample_reminder("u1", "Walk", now);
        repo.insert(&reminder).unwrap();

        let result = repo
            .update("u2", reminder.id, &ReminderUpdate::default(), now)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_corrupt_id_surfaces_storage_error() {
        let repo = repo();
        let now = Utc::now().timestamp_millis();
        repo.db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO reminders
                     (id, user_id, title, notes, time_of_day, frequency, weekday, is_active, created_at, updated_at)
                     VALUES ('not-a-uuid', 'u1', 'Walk', '', '20:00', 'daily', NULL, 1, ?1, ?1)",
                    rusqlite::params![now],
                )
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
                Ok(())
            })
            .unwrap();

        let err = repo.list("u1").unwrap_err();
        assert!(matches!(err, HealthmateError::Storage(_)));
    }

    #[test]
    fn test_delete_idempotent() {
        let repo = repo();
        let reminder = sample_reminder("u1", "Walk", Utc::now());
        repo.insert(&reminder).unwrap();

        repo.delete("u1", reminder.id).unwrap();
        repo.delete("u1", reminder.id).unwrap();
        assert!(repo.list("u1").unwrap().is_empty());
    }
}

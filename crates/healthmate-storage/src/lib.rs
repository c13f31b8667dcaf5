//! HealthMate storage crate - SQLite persistence.
//!
//! Provides a WAL-mode SQLite database with migrations plus repository
//! implementations for conversations and reminders.

pub mod conversations;
pub mod db;
pub mod migrations;
pub mod reminders;

pub use conversations::ConversationRepository;
pub use db::Database;
pub use reminders::{ReminderRepository, ReminderUpdate};

//! SQLite connection handling.
//!
//! One connection guarded by a mutex, opened in WAL mode with the pragmas
//! the repositories rely on, and migrated to the current schema on open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use healthmate_core::error::HealthmateError;

use crate::migrations;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA foreign_keys = ON;";

/// Handle to the SQLite database.
///
/// rusqlite's `Connection` is not `Sync`, so every caller goes through the
/// mutex via [`Database::with_conn`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database file, creating it and its parent directory when
    /// absent, and bring the schema up to date.
    pub fn new(path: &Path) -> Result<Self, HealthmateError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| HealthmateError::Storage(format!("Failed to open database: {}", e)))?;

        info!("Database opened at {}", path.display());
        Self::prepare(conn)
    }

    /// In-memory database for tests.
    pub fn in_memory() -> Result<Self, HealthmateError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| HealthmateError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, HealthmateError> {
        conn.execute_batch(PRAGMAS)
            .map_err(|e| HealthmateError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` against the locked connection.
    ///
    /// The lock is held until `f` returns, so multi-statement work inside one
    /// closure sees a consistent view.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, HealthmateError>
    where
        F: FnOnce(&Connection) -> Result<T, HealthmateError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| HealthmateError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::new(&path).unwrap();

        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM reminders", [], |row| row.get(0))
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let on: i64 = conn
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .map_err(|e| HealthmateError::Storage(e.to_string()))?;
            assert_eq!(on, 1);
            Ok(())
        })
        .unwrap();
    }
}

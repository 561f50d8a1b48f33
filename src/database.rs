use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

/// A stored week as listed by `weeks()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredWeek {
    pub key: String,
    pub updated_at: String,
}

/// Key-value store backed by a single SQLite table
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let db = Database { conn };
        db.initialize_schema()?;
        tracing::debug!(path, "database opened");

        Ok(db)
    }

    /// In-memory database, gone when dropped
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS weeks (
                key             TEXT PRIMARY KEY,
                data            TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_weeks_updated_at ON weeks(updated_at)",
            [],
        )?;

        Ok(())
    }

    /// Raw JSON stored under `key`
    pub fn get_week(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM weeks WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(data)
    }

    /// Insert or overwrite the JSON stored under `key`
    pub fn put_week(&self, key: &str, data: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO weeks (key, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            rusqlite::params![
                key,
                data,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All stored weeks, newest key first
    pub fn weeks(&self) -> Result<Vec<StoredWeek>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, updated_at FROM weeks ORDER BY key DESC")?;
        let weeks = stmt
            .query_map([], |row| {
                Ok(StoredWeek {
                    key: row.get(0)?,
                    updated_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(weeks)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_week(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.put_week(key, value)?)
    }
}

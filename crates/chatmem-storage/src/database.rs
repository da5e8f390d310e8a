// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! The turn store and the similarity index share one [`Database`].

use std::path::Path;

use chatmem_config::model::StorageConfig;
use chatmem_core::ChatmemError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the chatmem SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path` in WAL mode and apply migrations.
    pub async fn open(path: &str) -> Result<Self, ChatmemError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by a [`StorageConfig`].
    pub async fn from_config(config: &StorageConfig) -> Result<Self, ChatmemError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ChatmemError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ChatmemError::storage)?;
        }

        let conn = Connection::open(path).await.map_err(ChatmemError::storage)?;
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
        migrate(&conn).await?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, ChatmemError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(ChatmemError::storage)?;
        migrate(&conn).await?;
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Round-trip a trivial query to confirm the connection is alive.
    pub async fn ping(&self) -> Result<(), ChatmemError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), ChatmemError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }
}

async fn migrate(conn: &Connection) -> Result<(), ChatmemError> {
    conn.call(migrations::run_migrations)
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(inner) => inner,
            other => ChatmemError::storage(other),
        })
}

/// Convert tokio-rusqlite errors to [`ChatmemError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatmemError {
    ChatmemError::storage(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("chatmem.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists());
        db.ping().await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_enables_wal() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("wal.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn from_config_respects_wal_flag() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nowal.db");
        let config = StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: false,
        };
        let db = Database::from_config(&config).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_ne!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn reopen_keeps_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        let path = db_path.to_str().unwrap();
        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn open_in_memory_applies_schema() {
        let db = Database::open_in_memory().await.unwrap();
        let versions: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT COUNT(*) FROM refinery_schema_history", [], |row| {
                    row.get(0)
                })
            })
            .await
            .unwrap();
        assert_eq!(versions, 2);
        db.ping().await.unwrap();
    }
}

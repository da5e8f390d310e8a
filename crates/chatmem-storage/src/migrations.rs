// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary via
//! `embed_migrations!` and applied whenever a [`Database`](crate::Database)
//! is opened.

use chatmem_core::ChatmemError;
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Applied versions are tracked in refinery's `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ChatmemError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(ChatmemError::storage)?;
    for migration in report.applied_migrations() {
        debug!(version = migration.version(), name = migration.name(), "applied schema migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(conn: &rusqlite::Connection, sql: &str) -> Vec<String> {
        conn.prepare(sql)
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn migrations_create_schema() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let tables = names(
            &conn,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        );
        assert!(tables.contains(&"turns".to_string()));
        assert!(tables.contains(&"chunks".to_string()));
        assert!(tables.contains(&"refinery_schema_history".to_string()));
    }

    #[test]
    fn migrations_are_recorded_once() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();

        let applied = names(
            &conn,
            "SELECT name FROM refinery_schema_history ORDER BY version",
        );
        assert_eq!(applied, vec!["turns".to_string(), "chunks".to_string()]);
    }
}

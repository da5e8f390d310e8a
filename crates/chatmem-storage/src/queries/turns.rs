// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn CRUD operations.
//!
//! Timestamps are stored as fixed-width UTC text so that lexical order is
//! chronological order. Ties are broken by insertion sequence.

use std::str::FromStr;

use chatmem_core::{ChatmemError, Role, SortOrder, Turn};
use chrono::{DateTime, Utc};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::{map_tr_err, Database};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Render a timestamp in the stored text form.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Insert a new turn. Fails if the message id already exists.
pub async fn insert_turn(db: &Database, turn: &Turn) -> Result<(), ChatmemError> {
    let turn = turn.clone();
    let timestamp = format_timestamp(&turn.timestamp);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO turns (message_id, session_id, role, text, summary, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    turn.message_id,
                    turn.session_id,
                    turn.role.as_str(),
                    turn.text,
                    turn.summary,
                    timestamp,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a page of a session's turns ordered by timestamp.
///
/// `limit == usize::MAX` means no limit.
pub async fn find_turns(
    db: &Database,
    session_id: &str,
    order: SortOrder,
    limit: usize,
    offset: usize,
) -> Result<Vec<Turn>, ChatmemError> {
    let session_id = session_id.to_string();
    let sql = match order {
        SortOrder::NewestFirst => {
            "SELECT session_id, message_id, role, text, summary, timestamp
             FROM turns WHERE session_id = ?1
             ORDER BY timestamp DESC, seq DESC LIMIT ?2 OFFSET ?3"
        }
        SortOrder::OldestFirst => {
            "SELECT session_id, message_id, role, text, summary, timestamp
             FROM turns WHERE session_id = ?1
             ORDER BY timestamp ASC, seq ASC LIMIT ?2 OFFSET ?3"
        }
    };
    // SQLite treats a negative LIMIT as unbounded.
    let limit = i64::try_from(limit).unwrap_or(-1);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    db.connection()
        .call(move |conn| -> Result<Vec<Turn>, rusqlite::Error> {
            let mut stmt = conn.prepare(sql)?;
            let turns = stmt
                .query_map(params![session_id, limit, offset], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one turn of a session. Returns true if a row was removed.
pub async fn delete_turn(
    db: &Database,
    session_id: &str,
    message_id: &str,
) -> Result<bool, ChatmemError> {
    let session_id = session_id.to_string();
    let message_id = message_id.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let n = conn.execute(
                "DELETE FROM turns WHERE session_id = ?1 AND message_id = ?2",
                params![session_id, message_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete every turn of a session. Returns the number of rows removed.
pub async fn delete_session_turns(db: &Database, session_id: &str) -> Result<u64, ChatmemError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let n = conn.execute("DELETE FROM turns WHERE session_id = ?1", params![session_id])?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

/// Count a session's turns.
pub async fn count_turns(db: &Database, session_id: &str) -> Result<u64, ChatmemError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM turns WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )?;
            Ok(n as u64)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_turn(row: &rusqlite::Row) -> Result<Turn, rusqlite::Error> {
    let role: String = row.get(2)?;
    let role = Role::from_str(&role)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let timestamp: String = row.get(5)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    Ok(Turn {
        session_id: row.get(0)?,
        message_id: row.get(1)?,
        role,
        text: row.get(3)?,
        summary: row.get(4)?,
        timestamp,
    })
}

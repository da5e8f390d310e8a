// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunk and embedding operations.

use std::str::FromStr;

use chatmem_core::vector::{blob_to_vec, vec_to_blob};
use chatmem_core::{Chunk, Role, SearchFilter};
use rusqlite::params;
use rusqlite::types::Type;

use crate::database::Database;

/// A stored chunk together with its embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Insert or replace a chunk and its embedding.
pub async fn upsert_chunk(
    db: &Database,
    chunk: &Chunk,
    embedding: &[f32],
) -> Result<(), tokio_rusqlite::Error<rusqlite::Error>> {
    let chunk = chunk.clone();
    let blob = vec_to_blob(embedding);
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO chunks (id, session_id, message_id, role, sentence, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    chunk.chunk_id,
                    chunk.session_id,
                    chunk.message_id,
                    chunk.role.as_str(),
                    chunk.sentence,
                    blob,
                ],
            )?;
            Ok(())
        })
        .await
}

/// Load every chunk matching the filter, with embeddings.
pub async fn load_matching(
    db: &Database,
    filter: &SearchFilter,
) -> Result<Vec<StoredChunk>, tokio_rusqlite::Error<rusqlite::Error>> {
    let session_id = filter.session_id.clone();
    let message_id = filter.message_id.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<StoredChunk>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, session_id, message_id, role, sentence, embedding
                 FROM chunks
                 WHERE session_id = ?1 AND (?2 IS NULL OR message_id = ?2)
                 ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map(params![session_id, message_id], |row| {
                    let role: String = row.get(3)?;
                    let role = Role::from_str(&role).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?;
                    let blob: Vec<u8> = row.get(5)?;
                    Ok(StoredChunk {
                        chunk: Chunk {
                            chunk_id: row.get(0)?,
                            session_id: row.get(1)?,
                            message_id: row.get(2)?,
                            role,
                            sentence: row.get(4)?,
                        },
                        embedding: blob_to_vec(&blob),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
}

/// Ids of every chunk matching the filter.
pub async fn matching_ids(
    db: &Database,
    filter: &SearchFilter,
) -> Result<Vec<String>, tokio_rusqlite::Error<rusqlite::Error>> {
    let session_id = filter.session_id.clone();
    let message_id = filter.message_id.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id FROM chunks
                 WHERE session_id = ?1 AND (?2 IS NULL OR message_id = ?2)
                 ORDER BY rowid",
            )?;
            let ids = stmt
                .query_map(params![session_id, message_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(ids)
        })
        .await
}

/// Delete chunks by id in one transaction. Returns the number removed.
pub async fn delete_chunks(
    db: &Database,
    ids: &[String],
) -> Result<usize, tokio_rusqlite::Error<rusqlite::Error>> {
    if ids.is_empty() {
        return Ok(0);
    }
    let ids = ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            let mut removed = 0;
            {
                let mut stmt = tx.prepare("DELETE FROM chunks WHERE id = ?1")?;
                for id in &ids {
                    removed += stmt.execute(params![id])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: &str, session: &str, message: &str) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            sentence: format!("sentence {id}"),
            session_id: session.to_string(),
            message_id: message.to_string(),
            role: Role::Answer,
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_chunk() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_chunk(&db, &chunk("c1", "s1", "m1"), &[1.0, 0.0]).await.unwrap();
        upsert_chunk(&db, &chunk("c1", "s1", "m1"), &[0.0, 1.0]).await.unwrap();

        let stored = load_matching(&db, &SearchFilter::session("s1")).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].embedding, vec![0.0, 1.0]);
        assert_eq!(stored[0].chunk.role, Role::Answer);
    }

    #[tokio::test]
    async fn filters_by_session_and_message() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_chunk(&db, &chunk("c1", "s1", "m1"), &[1.0]).await.unwrap();
        upsert_chunk(&db, &chunk("c2", "s1", "m2"), &[1.0]).await.unwrap();
        upsert_chunk(&db, &chunk("c3", "s2", "m3"), &[1.0]).await.unwrap();

        let ids = matching_ids(&db, &SearchFilter::session("s1")).await.unwrap();
        assert_eq!(ids, vec!["c1", "c2"]);

        let ids = matching_ids(&db, &SearchFilter::session("s1").with_message("m2"))
            .await
            .unwrap();
        assert_eq!(ids, vec!["c2"]);
    }

    #[tokio::test]
    async fn delete_chunks_counts_removed_rows() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_chunk(&db, &chunk("c1", "s1", "m1"), &[1.0]).await.unwrap();
        upsert_chunk(&db, &chunk("c2", "s1", "m1"), &[1.0]).await.unwrap();

        let removed = delete_chunks(&db, &["c1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(delete_chunks(&db, &[]).await.unwrap(), 0);
    }
}

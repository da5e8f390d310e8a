// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed similarity index.
//!
//! Vectors are stored as little-endian f32 BLOBs next to their chunk
//! metadata. Search loads the rows matching the filter and ranks them by
//! cosine similarity in memory.

use async_trait::async_trait;
use tracing::debug;

use chatmem_core::vector::cosine_similarity;
use chatmem_core::{
    AdapterType, ChatmemError, Chunk, Collaborator, HealthStatus, PluginAdapter, SearchFilter,
    SimilarityHit, SimilarityIndex,
};

use crate::database::Database;
use crate::queries;

fn index_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ChatmemError {
    ChatmemError::Retrieval {
        collaborator: Collaborator::Index,
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

/// Brute-force cosine index over the `chunks` table.
#[derive(Clone)]
pub struct SqliteVectorIndex {
    db: Database,
}

impl SqliteVectorIndex {
    /// Create an index over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorIndex {
    fn name(&self) -> &str {
        "sqlite-cosine"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SimilarityIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        match self.db.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl SimilarityIndex for SqliteVectorIndex {
    async fn upsert(&self, chunk: &Chunk, vector: &[f32]) -> Result<(), ChatmemError> {
        queries::chunks::upsert_chunk(&self.db, chunk, vector)
            .await
            .map_err(index_err)
    }

    async fn search(
        &self,
        query: &[f32],
        filter: &SearchFilter,
        k: usize,
    ) -> Result<Vec<SimilarityHit>, ChatmemError> {
        if k == 0 {
            return Ok(vec![]);
        }

        let candidates = queries::chunks::load_matching(&self.db, filter)
            .await
            .map_err(index_err)?;
        let total = candidates.len();

        let mut hits: Vec<SimilarityHit> = candidates
            .into_iter()
            .map(|stored| SimilarityHit {
                score: cosine_similarity(query, &stored.embedding),
                chunk: stored.chunk,
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);

        debug!(
            session_id = %filter.session_id,
            candidates = total,
            returned = hits.len(),
            "similarity search"
        );
        Ok(hits)
    }

    async fn matching_ids(&self, filter: &SearchFilter) -> Result<Vec<String>, ChatmemError> {
        queries::chunks::matching_ids(&self.db, filter)
            .await
            .map_err(index_err)
    }

    async fn delete(&self, id: &str) -> Result<(), ChatmemError> {
        queries::chunks::delete_chunks(&self.db, &[id.to_string()])
            .await
            .map_err(index_err)?;
        Ok(())
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<usize, ChatmemError> {
        queries::chunks::delete_chunks(&self.db, ids)
            .await
            .map_err(index_err)
    }
}

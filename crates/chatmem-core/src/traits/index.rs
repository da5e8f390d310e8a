// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity index trait.

use async_trait::async_trait;

use crate::error::ChatmemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Chunk, SearchFilter, SimilarityHit};

/// Vector search over chunk embeddings.
///
/// The index owns chunk vectors and metadata; chunks are logically owned by
/// their turn and must be removed when the turn is forgotten. Failures are
/// reported as [`ChatmemError::Retrieval`] with
/// [`Collaborator::Index`](crate::Collaborator::Index).
#[async_trait]
pub trait SimilarityIndex: PluginAdapter {
    /// Inserts or replaces the vector and metadata stored under `chunk.chunk_id`.
    async fn upsert(&self, chunk: &Chunk, vector: &[f32]) -> Result<(), ChatmemError>;

    /// Returns at most `k` chunks matching `filter`, best-first by similarity.
    async fn search(
        &self,
        query: &[f32],
        filter: &SearchFilter,
        k: usize,
    ) -> Result<Vec<SimilarityHit>, ChatmemError>;

    /// Lists the ids of every chunk matching `filter`.
    async fn matching_ids(&self, filter: &SearchFilter) -> Result<Vec<String>, ChatmemError>;

    /// Removes one chunk. Removing an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), ChatmemError>;

    /// Removes several chunks, returning how many existed.
    async fn delete_batch(&self, ids: &[String]) -> Result<usize, ChatmemError>;
}

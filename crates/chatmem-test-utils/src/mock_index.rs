// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity index double that fails every operation.

use async_trait::async_trait;

use chatmem_core::{
    AdapterType, ChatmemError, Chunk, HealthStatus, PluginAdapter, SearchFilter, SimilarityHit,
    SimilarityIndex,
};

#[derive(Debug, Default)]
pub struct FailingIndex;

impl FailingIndex {
    pub fn new() -> Self {
        Self
    }

    fn err() -> ChatmemError {
        ChatmemError::index("similarity index unavailable")
    }
}

#[async_trait]
impl PluginAdapter for FailingIndex {
    fn name(&self) -> &str {
        "failing-index"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SimilarityIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Unhealthy("index configured to fail".into()))
    }
}

#[async_trait]
impl SimilarityIndex for FailingIndex {
    async fn upsert(&self, _chunk: &Chunk, _vector: &[f32]) -> Result<(), ChatmemError> {
        Err(Self::err())
    }

    async fn search(
        &self,
        _query: &[f32],
        _filter: &SearchFilter,
        _k: usize,
    ) -> Result<Vec<SimilarityHit>, ChatmemError> {
        Err(Self::err())
    }

    async fn matching_ids(&self, _filter: &SearchFilter) -> Result<Vec<String>, ChatmemError> {
        Err(Self::err())
    }

    async fn delete(&self, _id: &str) -> Result<(), ChatmemError> {
        Err(Self::err())
    }

    async fn delete_batch(&self, _ids: &[String]) -> Result<usize, ChatmemError> {
        Err(Self::err())
    }
}

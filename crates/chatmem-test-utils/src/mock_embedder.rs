// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedders for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use chatmem_core::vector::l2_normalize;
use chatmem_core::{AdapterType, ChatmemError, Embedder, HealthStatus, PluginAdapter};

/// Default vector width.
pub const DEFAULT_DIMENSIONS: usize = 256;

/// Embeds text as an L2-normalised bag of hashed lowercase words.
///
/// Texts sharing words score higher than texts that do not, which is enough
/// to make similarity search behave predictably in tests.
pub struct HashingEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Synchronous embedding used by the async trait method.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let slot = fnv1a(&word.to_lowercase()) as usize % self.dimensions;
            vector[slot] += 1.0;
        }
        l2_normalize(&vector)
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatmemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embed_sync(text))
    }
}

/// Embedder that fails every call after a number of successful ones.
pub struct FailingEmbedder {
    inner: HashingEmbedder,
    succeed_first: usize,
    served: AtomicUsize,
}

impl FailingEmbedder {
    /// Fails every call.
    pub fn new() -> Self {
        Self::after(0)
    }

    /// Serves `n` embeddings, then fails.
    pub fn after(n: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(),
            succeed_first: n,
            served: AtomicUsize::new(0),
        }
    }
}

impl Default for FailingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for FailingEmbedder {
    fn name(&self) -> &str {
        "failing-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Unhealthy("embedder configured to fail".into()))
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatmemError> {
        let n = self.served.fetch_add(1, Ordering::SeqCst);
        if n < self.succeed_first {
            self.inner.embed(text).await
        } else {
            Err(ChatmemError::embedder("embedding service unavailable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmem_core::vector::cosine_similarity;

    #[test]
    fn shared_words_score_higher() {
        let e = HashingEmbedder::new();
        let q = e.embed_sync("capital of Brazil");
        let near = e.embed_sync("Brasilia is the capital of Brazil");
        let far = e.embed_sync("pasta recipes with tomato");
        assert!(cosine_similarity(&q, &near) > cosine_similarity(&q, &far));
    }

    #[test]
    fn embedding_is_case_insensitive_and_deterministic() {
        let e = HashingEmbedder::with_dimensions(32);
        assert_eq!(e.embed_sync("Hello World"), e.embed_sync("hello world"));
        assert_eq!(e.embed_sync("hello").len(), 32);
    }

    #[tokio::test]
    async fn failing_embedder_after_n() {
        let e = FailingEmbedder::after(1);
        assert!(e.embed("one").await.is_ok());
        let err = e.embed("two").await.unwrap_err();
        assert_eq!(err.collaborator(), Some(chatmem_core::Collaborator::Embedder));
    }
}

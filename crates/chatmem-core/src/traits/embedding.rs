// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding service trait.

use async_trait::async_trait;

use crate::error::ChatmemError;
use crate::traits::adapter::PluginAdapter;

/// Converts text into a fixed-length vector.
///
/// Implementations must be deterministic for a given model. The vector
/// length is a model property that callers treat opaquely. Failures are
/// reported as [`ChatmemError::Retrieval`] with
/// [`Collaborator::Embedder`](crate::Collaborator::Embedder).
#[async_trait]
pub trait Embedder: PluginAdapter {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatmemError>;
}

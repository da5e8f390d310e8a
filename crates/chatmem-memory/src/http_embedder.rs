// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedder backed by an OpenAI-compatible `/embeddings` endpoint.

use async_trait::async_trait;

use chatmem_config::model::EmbeddingConfig;
use chatmem_core::{
    AdapterType, ChatmemError, Collaborator, Embedder, HealthStatus, PluginAdapter,
};

use crate::openai::{OpenAiClient, OpenAiError};

pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Build from the `[embedding]` section. Requires `api_key`.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, ChatmemError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ChatmemError::Config("embedding.api_key is required".to_string()))?;
        let client = OpenAiClient::new(&config.api_base, key)
            .map_err(|e| ChatmemError::Config(format!("invalid embedding client: {e}")))?;
        Ok(Self::new(client, &config.openai_model))
    }
}

fn retrieval_error(err: OpenAiError) -> ChatmemError {
    ChatmemError::Retrieval {
        collaborator: Collaborator::Embedder,
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatmemError> {
        self.client
            .embed(&self.model, text)
            .await
            .map_err(retrieval_error)
    }
}

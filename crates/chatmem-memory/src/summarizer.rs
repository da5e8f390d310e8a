// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarizer implementations.
//!
//! [`ExtractiveSummarizer`] keeps the most representative sentences through
//! the [`ExtractiveCompressor`]. [`OpenAiSummarizer`] asks an
//! OpenAI-compatible chat model for a short abstract.

use std::sync::Arc;

use async_trait::async_trait;

use chatmem_config::model::SummarizerConfig;
use chatmem_core::{AdapterType, ChatmemError, HealthStatus, PluginAdapter, Summarizer};

use crate::compressor::ExtractiveCompressor;
use crate::openai::OpenAiClient;

const SUMMARY_PROMPT: &str = "Write a very short summary in the same language as the text:";

/// Summarizer that never fails: the compressor degrades to the input.
pub struct ExtractiveSummarizer {
    compressor: Arc<ExtractiveCompressor>,
    target_tokens: usize,
}

impl ExtractiveSummarizer {
    pub fn new(compressor: Arc<ExtractiveCompressor>, target_tokens: usize) -> Self {
        Self {
            compressor,
            target_tokens,
        }
    }
}

#[async_trait]
impl PluginAdapter for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive-summarizer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Summarizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ChatmemError> {
        Ok(self.compressor.compress(text, self.target_tokens).await)
    }
}

/// Chat-completion summarizer for OpenAI-compatible APIs.
pub struct OpenAiSummarizer {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
    max_input_words: usize,
}

impl OpenAiSummarizer {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 256,
            max_input_words: 1024,
        }
    }

    /// Build from the `[summarizer]` section. Requires `api_key`.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, ChatmemError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ChatmemError::Config("summarizer.api_key is required".to_string()))?;
        let client = OpenAiClient::new(&config.api_base, key)
            .map_err(|e| ChatmemError::Config(format!("invalid summarizer client: {e}")))?;
        Ok(Self {
            client,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            max_input_words: config.max_input_words,
        })
    }

    fn prompt(&self, text: &str) -> String {
        let cropped = text
            .split_whitespace()
            .take(self.max_input_words)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{SUMMARY_PROMPT}\n\n{cropped}")
    }
}

#[async_trait]
impl PluginAdapter for OpenAiSummarizer {
    fn name(&self) -> &str {
        "openai-summarizer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Summarizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ChatmemError> {
        self.client
            .complete(&self.model, &self.prompt(text), self.max_tokens)
            .await
            .map_err(|e| ChatmemError::Summarizer {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmem_test_utils::HashingEmbedder;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::tokens::TokenCounter;

    fn openai(server: &MockServer) -> OpenAiSummarizer {
        let client = OpenAiClient::new(&server.uri(), "sk-test").unwrap();
        OpenAiSummarizer::new(client, "gpt-3.5-turbo")
    }

    #[test]
    fn prompt_crops_to_word_limit() {
        let client = OpenAiClient::new("http://localhost", "sk-test").unwrap();
        let mut summarizer = OpenAiSummarizer::new(client, "m");
        summarizer.max_input_words = 3;

        let prompt = summarizer.prompt("one  two\nthree four five");
        assert_eq!(
            prompt,
            "Write a very short summary in the same language as the text:\n\none two three"
        );
    }

    #[tokio::test]
    async fn openai_summary_is_trimmed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 256
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "  Short.  " } }]
            })))
            .mount(&server)
            .await;

        let summary = openai(&server).summarize("A long text.").await.unwrap();
        assert_eq!(summary, "Short.");
    }

    #[tokio::test]
    async fn openai_failure_is_summarizer_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = openai(&server).summarize("text").await.unwrap_err();
        assert!(matches!(err, ChatmemError::Summarizer { .. }));
    }

    #[tokio::test]
    async fn extractive_passes_short_text_through() {
        let tokens = Arc::new(TokenCounter::cl100k().unwrap());
        let compressor = Arc::new(ExtractiveCompressor::new(
            Arc::new(HashingEmbedder::new()),
            tokens,
        ));
        let summarizer = ExtractiveSummarizer::new(compressor, 500);

        let text = "Short answer. Nothing to cut.";
        assert_eq!(summarizer.summarize(text).await.unwrap(), text);
    }
}

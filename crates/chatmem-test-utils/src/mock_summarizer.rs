// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarizer doubles.
//!
//! `ScriptedSummarizer` returns pre-configured summaries from a FIFO queue
//! and echoes its input once the queue is drained.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chatmem_core::{AdapterType, ChatmemError, HealthStatus, PluginAdapter, Summarizer};

pub struct ScriptedSummarizer {
    responses: Arc<Mutex<VecDeque<String>>>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSummarizer {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Inputs received so far, in call order.
    pub async fn inputs(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

impl Default for ScriptedSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedSummarizer {
    fn name(&self) -> &str {
        "scripted-summarizer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Summarizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, ChatmemError> {
        self.seen.lock().await.push(text.to_string());
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| text.to_string()))
    }
}

/// Summarizer that always fails.
#[derive(Debug, Default)]
pub struct FailingSummarizer;

#[async_trait]
impl PluginAdapter for FailingSummarizer {
    fn name(&self) -> &str {
        "failing-summarizer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Summarizer
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        Ok(HealthStatus::Unhealthy("summarizer configured to fail".into()))
    }
}

#[async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, ChatmemError> {
        Err(ChatmemError::Summarizer {
            message: "summarizer unavailable".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_then_echo() {
        let s = ScriptedSummarizer::with_responses(vec!["short".into()]);
        assert_eq!(s.summarize("long text").await.unwrap(), "short");
        assert_eq!(s.summarize("again").await.unwrap(), "again");
        assert_eq!(s.inputs().await, vec!["long text", "again"]);
    }
}

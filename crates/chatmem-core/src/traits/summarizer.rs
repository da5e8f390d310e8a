// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarizer trait for human-readable turn summaries.

use async_trait::async_trait;

use crate::error::ChatmemError;
use crate::traits::adapter::PluginAdapter;

/// Produces a short summary of a turn's text.
///
/// Callers must treat failures as recoverable: the memory facade falls back
/// to extractive compression whenever `summarize` returns an error.
#[async_trait]
pub trait Summarizer: PluginAdapter {
    /// Summarizes `text`.
    async fn summarize(&self, text: &str) -> Result<String, ChatmemError>;
}

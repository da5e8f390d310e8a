// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for chatmem integration tests.
//!
//! Provides deterministic mock collaborators and in-memory storage so that
//! recall and compression can be exercised without model downloads or
//! network access.
//!
//! # Components
//!
//! - [`HashingEmbedder`] - bag-of-words embedder using the hashing trick
//! - [`FailingEmbedder`] - embedder that fails, optionally after N successes
//! - [`ScriptedSummarizer`] / [`FailingSummarizer`] - summarizer doubles
//! - [`FailingIndex`] - similarity index that rejects every call
//! - [`harness::in_memory_backends`] - SQLite turn store and index on one in-memory database

pub mod harness;
pub mod mock_embedder;
pub mod mock_index;
pub mod mock_summarizer;

pub use harness::in_memory_backends;
pub use mock_embedder::{FailingEmbedder, HashingEmbedder};
pub use mock_index::FailingIndex;
pub use mock_summarizer::{FailingSummarizer, ScriptedSummarizer};

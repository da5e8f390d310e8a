// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational memory for chat agents.
//!
//! [`ConversationMemory`] persists question/answer turns and, for each new
//! prompt, rebuilds a bounded context from the session's most recent turns
//! plus semantically similar older chunks. Turn summaries are kept short by
//! the [`ExtractiveCompressor`], which selects sentences by embedding
//! centrality, LDA topic salience, and lexical diversity.

pub mod chunker;
pub mod compressor;
pub mod embedder;
pub mod http_embedder;
pub mod memory;
pub mod model_manager;
pub mod openai;
pub mod recall;
pub mod summarizer;
pub mod tokens;

pub use chunker::Chunker;
pub use compressor::ExtractiveCompressor;
pub use embedder::OnnxEmbedder;
pub use http_embedder::OpenAiEmbedder;
pub use memory::{ConversationMemory, ListQuery, Listing, MemoryBuilder, RecordReceipt};
pub use model_manager::ModelManager;
pub use openai::{OpenAiClient, OpenAiError};
pub use recall::{format_suggested_text, RecallEngine, Recollection};
pub use summarizer::{ExtractiveSummarizer, OpenAiSummarizer};
pub use tokens::TokenCounter;

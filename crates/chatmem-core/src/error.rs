// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for chatmem.

use strum::Display;
use thiserror::Error;

/// The retrieval-side collaborator that produced a [`ChatmemError::Retrieval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collaborator {
    /// The embedding service.
    Embedder,
    /// The similarity index.
    Index,
}

/// The primary error type used across all chatmem collaborator traits and operations.
#[derive(Debug, Error)]
pub enum ChatmemError {
    /// Configuration errors (invalid TOML, missing credentials, bad adapter selection).
    #[error("configuration error: {0}")]
    Config(String),

    /// Turn store errors (database connection, query failure, corrupt rows).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding or similarity-index failure.
    #[error("retrieval error ({collaborator}): {message}")]
    Retrieval {
        collaborator: Collaborator,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Abstractive summarizer failure. The memory facade recovers from this
    /// by falling back to the extractive compressor.
    #[error("summarizer error: {message}")]
    Summarizer {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extractive compression failure. Never escapes `compress`.
    #[error("compression error: {0}")]
    Compression(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatmemError {
    /// Builds a storage error from any error type.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ChatmemError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds an embedder-side retrieval error without an underlying source.
    pub fn embedder(message: impl Into<String>) -> Self {
        ChatmemError::Retrieval {
            collaborator: Collaborator::Embedder,
            message: message.into(),
            source: None,
        }
    }

    /// Builds an index-side retrieval error without an underlying source.
    pub fn index(message: impl Into<String>) -> Self {
        ChatmemError::Retrieval {
            collaborator: Collaborator::Index,
            message: message.into(),
            source: None,
        }
    }

    /// True when the Turn Store failed.
    pub fn is_storage(&self) -> bool {
        matches!(self, ChatmemError::Storage { .. })
    }

    /// True when the embedder or the similarity index failed.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, ChatmemError::Retrieval { .. })
    }

    /// The failing retrieval collaborator, if this is a retrieval error.
    pub fn collaborator(&self) -> Option<Collaborator> {
        match self {
            ChatmemError::Retrieval { collaborator, .. } => Some(*collaborator),
            _ => None,
        }
    }
}

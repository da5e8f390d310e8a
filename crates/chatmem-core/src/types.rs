// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared across collaborator traits and the memory engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which side of an exchange a turn (or chunk) belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The user's prompt.
    Question,
    /// The agent's reply.
    Answer,
}

impl Role {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Question => "question",
            Role::Answer => "answer",
        }
    }
}

/// One side of a question/answer exchange.
///
/// Turns are immutable once created; the only permitted mutation is deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Grouping key; every turn belongs to exactly one session.
    pub session_id: String,
    /// Globally unique identifier, one per question and one per answer.
    pub message_id: String,
    pub role: Role,
    /// Original content.
    pub text: String,
    /// Compressed content. Equal to `text` when it was already short enough.
    pub summary: String,
    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
}

/// A length-bounded fragment of a turn's summary, embedded and indexed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub sentence: String,
    pub session_id: String,
    /// Back-reference to the owning turn.
    pub message_id: String,
    pub role: Role,
}

/// A chunk returned by nearest-neighbour search, best-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityHit {
    pub chunk: Chunk,
    /// Cosine similarity between the query vector and the chunk vector.
    pub score: f32,
}

/// Exact-match filter applied to similarity search and chunk enumeration.
///
/// The session is mandatory so that no query can span sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub session_id: String,
    pub message_id: Option<String>,
}

impl SearchFilter {
    /// Filter matching every chunk of a session.
    pub fn session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            message_id: None,
        }
    }

    /// Narrow the filter to the chunks of a single message.
    pub fn with_message(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// True if the chunk satisfies every field of the filter.
    pub fn matches(&self, chunk: &Chunk) -> bool {
        chunk.session_id == self.session_id
            && self
                .message_id
                .as_deref()
                .is_none_or(|m| m == chunk.message_id)
    }
}

/// Timestamp ordering for turn listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Most recent first.
    NewestFirst,
    /// Oldest first (chronological).
    OldestFirst,
}

impl SortOrder {
    /// Map the `recent_first` flag used by listing operations.
    pub fn from_recent_first(recent_first: bool) -> Self {
        if recent_first {
            SortOrder::NewestFirst
        } else {
            SortOrder::OldestFirst
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    TurnStore,
    SimilarityIndex,
    Embedding,
    Summarizer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn chunk(session: &str, message: &str) -> Chunk {
        Chunk {
            chunk_id: "c1".into(),
            sentence: "hello".into(),
            session_id: session.into(),
            message_id: message.into(),
            role: Role::Question,
        }
    }

    #[test]
    fn role_string_forms() {
        assert_eq!(Role::Question.as_str(), "question");
        assert_eq!(Role::Answer.to_string(), "answer");
        assert_eq!(Role::from_str("question").unwrap(), Role::Question);
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Answer).unwrap();
        assert_eq!(json, "\"answer\"");
    }

    #[test]
    fn session_filter_matches_only_its_session() {
        let filter = SearchFilter::session("s1");
        assert!(filter.matches(&chunk("s1", "m1")));
        assert!(filter.matches(&chunk("s1", "m2")));
        assert!(!filter.matches(&chunk("s2", "m1")));
    }

    #[test]
    fn message_filter_narrows_session_filter() {
        let filter = SearchFilter::session("s1").with_message("m1");
        assert!(filter.matches(&chunk("s1", "m1")));
        assert!(!filter.matches(&chunk("s1", "m2")));
        assert!(!filter.matches(&chunk("s2", "m1")));
    }

    #[test]
    fn sort_order_from_flag() {
        assert_eq!(SortOrder::from_recent_first(true), SortOrder::NewestFirst);
        assert_eq!(SortOrder::from_recent_first(false), SortOrder::OldestFirst);
    }
}

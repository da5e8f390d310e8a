// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn store trait for durable question/answer records.

use async_trait::async_trait;

use crate::error::ChatmemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{SortOrder, Turn};

/// Durable record of turns grouped by session.
///
/// Failures are reported as [`ChatmemError::Storage`]. Deletions are
/// idempotent: removing an absent message or session is not an error.
#[async_trait]
pub trait TurnStore: PluginAdapter {
    /// Persists a new turn.
    async fn insert(&self, turn: &Turn) -> Result<(), ChatmemError>;

    /// Returns a window of a session's turns ordered by timestamp.
    async fn find(
        &self,
        session_id: &str,
        order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Turn>, ChatmemError>;

    /// Deletes one turn, returning whether it existed.
    async fn delete_one(&self, session_id: &str, message_id: &str) -> Result<bool, ChatmemError>;

    /// Deletes every turn of a session, returning how many were removed.
    async fn delete_many(&self, session_id: &str) -> Result<u64, ChatmemError>;

    /// Number of turns stored for a session.
    async fn count(&self, session_id: &str) -> Result<u64, ChatmemError>;
}

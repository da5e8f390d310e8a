// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the TurnStore trait.

use async_trait::async_trait;
use tracing::debug;

use chatmem_core::{
    AdapterType, ChatmemError, HealthStatus, PluginAdapter, SortOrder, Turn, TurnStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed turn store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
#[derive(Clone)]
pub struct SqliteTurnStore {
    db: Database,
}

impl SqliteTurnStore {
    /// Create a turn store over an opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteTurnStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::TurnStore
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        match self.db.ping().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl TurnStore for SqliteTurnStore {
    async fn insert(&self, turn: &Turn) -> Result<(), ChatmemError> {
        queries::turns::insert_turn(&self.db, turn).await?;
        debug!(session_id = %turn.session_id, message_id = %turn.message_id, role = %turn.role, "turn stored");
        Ok(())
    }

    async fn find(
        &self,
        session_id: &str,
        order: SortOrder,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Turn>, ChatmemError> {
        queries::turns::find_turns(&self.db, session_id, order, limit, offset).await
    }

    async fn delete_one(&self, session_id: &str, message_id: &str) -> Result<bool, ChatmemError> {
        queries::turns::delete_turn(&self.db, session_id, message_id).await
    }

    async fn delete_many(&self, session_id: &str) -> Result<u64, ChatmemError> {
        queries::turns::delete_session_turns(&self.db, session_id).await
    }

    async fn count(&self, session_id: &str) -> Result<u64, ChatmemError> {
        queries::turns::count_turns(&self.db, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmem_core::Role;
    use chrono::Utc;

    #[tokio::test]
    async fn sqlite_turn_store_implements_plugin_adapter() {
        let store = SqliteTurnStore::new(Database::open_in_memory().await.unwrap());
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::TurnStore);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn round_trip_through_trait_object() {
        let store: Box<dyn TurnStore> =
            Box::new(SqliteTurnStore::new(Database::open_in_memory().await.unwrap()));
        let turn = Turn {
            session_id: "s1".into(),
            message_id: "m1".into(),
            role: Role::Question,
            text: "Where is Rome?".into(),
            summary: "Where is Rome?".into(),
            timestamp: Utc::now(),
        };
        store.insert(&turn).await.unwrap();

        let found = store.find("s1", SortOrder::NewestFirst, 1, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, turn.text);
        assert_eq!(store.count("s1").await.unwrap(), 1);
        assert!(store.delete_one("s1", "m1").await.unwrap());
        assert_eq!(store.delete_many("s1").await.unwrap(), 0);
    }
}

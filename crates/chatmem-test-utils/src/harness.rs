// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage for tests.

use std::sync::Arc;

use chatmem_core::{ChatmemError, SimilarityIndex, TurnStore};
use chatmem_storage::{Database, SqliteTurnStore, SqliteVectorIndex};

/// Open a private in-memory database and return a turn store and a
/// similarity index backed by it.
pub async fn in_memory_backends()
-> Result<(Arc<dyn TurnStore>, Arc<dyn SimilarityIndex>), ChatmemError> {
    let db = Database::open_in_memory().await?;
    tracing::debug!("in-memory test database ready");
    Ok((
        Arc::new(SqliteTurnStore::new(db.clone())),
        Arc::new(SqliteVectorIndex::new(db)),
    ))
}

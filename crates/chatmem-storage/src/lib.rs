// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for chatmem.
//!
//! Provides a WAL-mode SQLite database with versioned schema migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and the two
//! persistent collaborators of the memory engine: the turn store and the
//! brute-force cosine similarity index.

pub mod adapter;
pub mod database;
pub mod index;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteTurnStore;
pub use database::Database;
pub use index::SqliteVectorIndex;

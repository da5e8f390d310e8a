// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator capability traits.
//!
//! All collaborators extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The memory engine
//! holds them as `Arc<dyn Trait>` chosen at construction time.

pub mod adapter;
pub mod embedding;
pub mod index;
pub mod store;
pub mod summarizer;

pub use adapter::PluginAdapter;
pub use embedding::Embedder;
pub use index::SimilarityIndex;
pub use store::TurnStore;
pub use summarizer::Summarizer;

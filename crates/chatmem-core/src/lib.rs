// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for chatmem conversational memory.
//!
//! This crate provides the collaborator capability traits, the error
//! taxonomy, and the data model shared by every other chatmem crate. The
//! recall engine and the memory facade depend only on the traits defined
//! here; concrete stores, indexes, embedders, and summarizers live in the
//! adapter crates.

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ChatmemError, Collaborator};
pub use types::{AdapterType, Chunk, HealthStatus, Role, SearchFilter, SimilarityHit, SortOrder, Turn};

// Re-export all adapter traits at crate root.
pub use traits::{Embedder, PluginAdapter, SimilarityIndex, Summarizer, TurnStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chatmem_error_has_all_variants() {
        let _config = ChatmemError::Config("test".into());
        let _storage = ChatmemError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _retrieval = ChatmemError::Retrieval {
            collaborator: Collaborator::Embedder,
            message: "test".into(),
            source: None,
        };
        let _summarizer = ChatmemError::Summarizer {
            message: "test".into(),
            source: None,
        };
        let _compression = ChatmemError::Compression("test".into());
        let _internal = ChatmemError::Internal("test".into());
    }

    #[test]
    fn adapter_type_has_four_variants() {
        use std::str::FromStr;

        let variants = [
            AdapterType::TurnStore,
            AdapterType::SimilarityIndex,
            AdapterType::Embedding,
            AdapterType::Summarizer,
        ];

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_embedder<T: Embedder>() {}
        fn _assert_similarity_index<T: SimilarityIndex>() {}
        fn _assert_turn_store<T: TurnStore>() {}
        fn _assert_summarizer<T: Summarizer>() {}
    }
}

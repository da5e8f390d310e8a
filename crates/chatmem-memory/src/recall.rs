// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid recall combining the recency window with similarity search.
//!
//! The recent turns of a session are returned verbatim. Similarity hits
//! that belong to one of those turns are discarded, and the best remaining
//! hits are rendered ahead of the recent turns in the suggested context.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

use chatmem_config::model::RecallConfig;
use chatmem_core::{
    ChatmemError, Embedder, Role, SearchFilter, SimilarityHit, SimilarityIndex, SortOrder, Turn,
    TurnStore,
};
use tracing::debug;

/// Result of a recall.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recollection {
    /// Recency window, newest first.
    pub recent: Vec<Turn>,
    /// Similarity hits outside the recency window, best first.
    pub context: Vec<SimilarityHit>,
    /// Text block ready to prepend to a new prompt.
    pub suggested_text: String,
}

/// Recall engine over a turn store, a similarity index, and an embedder.
pub struct RecallEngine {
    store: Arc<dyn TurnStore>,
    index: Arc<dyn SimilarityIndex>,
    embedder: Arc<dyn Embedder>,
    search_k: usize,
    context_hits: usize,
}

impl RecallEngine {
    pub fn new(
        store: Arc<dyn TurnStore>,
        index: Arc<dyn SimilarityIndex>,
        embedder: Arc<dyn Embedder>,
        config: &RecallConfig,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            search_k: config.search_k,
            context_hits: config.context_hits,
        }
    }

    /// Recall memory for `prompt` within `session_id`.
    ///
    /// 1. Fetches the `recent_count` newest turns (the recency window)
    /// 2. Embeds the prompt
    /// 3. Searches the session's chunks for the `search_k` nearest
    /// 4. Drops hits owned by a turn in the recency window, keeps `context_hits`
    /// 5. Formats the suggested context
    ///
    /// Store failures surface as storage errors; embedder and index failures
    /// surface as retrieval errors.
    pub async fn recall(
        &self,
        session_id: &str,
        prompt: &str,
        recent_count: usize,
    ) -> Result<Recollection, ChatmemError> {
        // Step 1: Recency window
        let recent = if recent_count == 0 {
            Vec::new()
        } else {
            self.store
                .find(session_id, SortOrder::NewestFirst, recent_count, 0)
                .await?
        };
        let excluded: HashSet<&str> = recent.iter().map(|t| t.message_id.as_str()).collect();

        // Step 2: Embed the prompt
        let query = self.embedder.embed(prompt).await?;

        // Step 3: Session-scoped similarity search
        let filter = SearchFilter::session(session_id);
        let hits = self.index.search(&query, &filter, self.search_k).await?;
        let candidates = hits.len();

        // Step 4: Exclude the recency window
        let context: Vec<SimilarityHit> = hits
            .into_iter()
            .filter(|hit| filter.matches(&hit.chunk))
            .filter(|hit| !excluded.contains(hit.chunk.message_id.as_str()))
            .take(self.context_hits)
            .collect();

        // Step 5: Format
        let suggested_text = format_suggested_text(&context, &recent);

        debug!(
            session_id,
            recent = recent.len(),
            candidates,
            context = context.len(),
            "recall complete"
        );

        Ok(Recollection {
            recent,
            context,
            suggested_text,
        })
    }
}

/// Render similarity hits (best first) followed by the recency window in
/// chronological order. `recent` is expected newest first.
pub fn format_suggested_text(context: &[SimilarityHit], recent: &[Turn]) -> String {
    let mut text = String::new();
    for hit in context {
        let side = match hit.chunk.role {
            Role::Question => "prompt",
            Role::Answer => "answer",
        };
        let _ = writeln!(text, "Previous context ({side}): {}", hit.chunk.sentence);
    }
    text.push('\n');
    for turn in recent.iter().rev() {
        let label = match turn.role {
            Role::Question => "Previous prompt",
            Role::Answer => "Previous answer",
        };
        let _ = writeln!(text, "{label}: {}", turn.summary);
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatmem_core::Chunk;
    use chatmem_test_utils::{in_memory_backends, FailingEmbedder, FailingIndex, HashingEmbedder};
    use chrono::{Duration, TimeZone, Utc};

    fn turn(message: &str, role: Role, summary: &str, secs: i64) -> Turn {
        Turn {
            session_id: "s1".into(),
            message_id: message.into(),
            role,
            text: summary.into(),
            summary: summary.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs),
        }
    }

    fn hit(message: &str, role: Role, sentence: &str) -> SimilarityHit {
        SimilarityHit {
            chunk: Chunk {
                chunk_id: format!("c-{message}"),
                sentence: sentence.into(),
                session_id: "s1".into(),
                message_id: message.into(),
                role,
            },
            score: 0.9,
        }
    }

    #[test]
    fn format_orders_hits_then_chronological_recent() {
        let context = vec![
            hit("q0", Role::Question, "What is the capital of Brazil?"),
            hit("a0", Role::Answer, "Brasília."),
        ];
        let recent = vec![
            turn("a1", Role::Answer, "Rome.", 2),
            turn("q1", Role::Question, "Capital of Italy?", 1),
        ];
        assert_eq!(
            format_suggested_text(&context, &recent),
            "Previous context (prompt): What is the capital of Brazil?\n\
             Previous context (answer): Brasília.\n\
             \n\
             Previous prompt: Capital of Italy?\n\
             Previous answer: Rome."
        );
    }

    #[test]
    fn format_without_hits_has_no_leading_blank_line() {
        let recent = vec![turn("q1", Role::Question, "Hi", 1)];
        assert_eq!(format_suggested_text(&[], &recent), "Previous prompt: Hi");
        assert_eq!(format_suggested_text(&[], &[]), "");
    }

    async fn engine_with(
        embedder: Arc<dyn Embedder>,
        index: Option<Arc<dyn SimilarityIndex>>,
    ) -> (RecallEngine, Arc<dyn TurnStore>, Arc<dyn SimilarityIndex>) {
        let (store, sqlite_index) = in_memory_backends().await.unwrap();
        let index = index.unwrap_or(sqlite_index);
        let engine = RecallEngine::new(
            store.clone(),
            index.clone(),
            embedder,
            &RecallConfig::default(),
        );
        (engine, store, index)
    }

    #[tokio::test]
    async fn empty_session_recalls_nothing() {
        let (engine, _, _) = engine_with(Arc::new(HashingEmbedder::new()), None).await;
        let r = engine.recall("nobody", "anything", 4).await.unwrap();
        assert_eq!(r, Recollection::default());
    }

    #[tokio::test]
    async fn recent_turns_are_excluded_from_context() {
        let embedder = Arc::new(HashingEmbedder::new());
        let (engine, store, index) = engine_with(embedder.clone(), None).await;

        for (i, (id, role, text)) in [
            ("q1", Role::Question, "capital of Brazil"),
            ("a1", Role::Answer, "Brasília is the capital of Brazil"),
            ("q2", Role::Question, "capital of Brazil again"),
            ("a2", Role::Answer, "still Brasília capital of Brazil"),
        ]
        .into_iter()
        .enumerate()
        {
            store.insert(&turn(id, role, text, i as i64)).await.unwrap();
            let chunk = hit(id, role, text).chunk;
            index.upsert(&chunk, &embedder.embed_sync(text)).await.unwrap();
        }

        let r = engine.recall("s1", "capital of Brazil", 2).await.unwrap();
        assert_eq!(r.recent.len(), 2);
        assert_eq!(r.recent[0].message_id, "a2");
        assert_eq!(r.context.len(), 2);
        for h in &r.context {
            assert!(h.chunk.message_id == "q1" || h.chunk.message_id == "a1");
        }
    }

    #[tokio::test]
    async fn embedder_failure_is_a_retrieval_error() {
        let (engine, _, _) = engine_with(Arc::new(FailingEmbedder::new()), None).await;
        let err = engine.recall("s1", "hello", 4).await.unwrap_err();
        assert_eq!(err.collaborator(), Some(chatmem_core::Collaborator::Embedder));
    }

    #[tokio::test]
    async fn index_failure_is_a_retrieval_error() {
        let (engine, _, _) = engine_with(
            Arc::new(HashingEmbedder::new()),
            Some(Arc::new(FailingIndex::new())),
        )
        .await;
        let err = engine.recall("s1", "hello", 4).await.unwrap_err();
        assert_eq!(err.collaborator(), Some(chatmem_core::Collaborator::Index));
    }
}

// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory facade: record, forget, list, and recall turns.
//!
//! Mutating operations take a shared write lock around the store and index
//! calls; reads run concurrently under the read side. Recording is two-phase
//! without rollback: when chunk indexing fails after the turns were stored,
//! the turns remain reachable through the recency window only.

use std::sync::Arc;

use chrono::{Duration, SubsecRound, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use chatmem_config::model::{
    ChatmemConfig, EmbeddingProvider, SummarizerProvider, ONNX_MODEL_NAME,
};
use chatmem_core::{
    ChatmemError, Chunk, Embedder, HealthStatus, Role, SearchFilter, SimilarityIndex, SortOrder,
    Summarizer, Turn, TurnStore,
};
use chatmem_storage::{Database, SqliteTurnStore, SqliteVectorIndex};

use crate::chunker::Chunker;
use crate::compressor::ExtractiveCompressor;
use crate::embedder::OnnxEmbedder;
use crate::http_embedder::OpenAiEmbedder;
use crate::model_manager::ModelManager;
use crate::recall::{RecallEngine, Recollection};
use crate::summarizer::{ExtractiveSummarizer, OpenAiSummarizer};
use crate::tokens::TokenCounter;

/// Identifiers assigned by [`ConversationMemory::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordReceipt {
    pub session_id: String,
    pub question_id: String,
    pub answer_id: String,
}

/// Parameters for [`ConversationMemory::list_messages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number; 0 is treated as 1.
    pub page: usize,
    pub limit: usize,
    pub recent_first: bool,
    /// Return only the number of turns in the session.
    pub count: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            recent_first: true,
            count: false,
        }
    }
}

/// Result of [`ConversationMemory::list_messages`].
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Count(u64),
    Page(Vec<Turn>),
}

/// Builder for [`ConversationMemory`] with injected collaborators.
pub struct MemoryBuilder {
    config: ChatmemConfig,
    store: Option<Arc<dyn TurnStore>>,
    index: Option<Arc<dyn SimilarityIndex>>,
    embedder: Option<Arc<dyn Embedder>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    tokens: Option<Arc<TokenCounter>>,
}

impl MemoryBuilder {
    fn new() -> Self {
        Self {
            config: ChatmemConfig::default(),
            store: None,
            index: None,
            embedder: None,
            summarizer: None,
            tokens: None,
        }
    }

    /// Recall, compression, and chunking settings.
    pub fn with_config(mut self, config: ChatmemConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn TurnStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn SimilarityIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Replace the extractive summarizer. Failures fall back to compression.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Share an already constructed token counter.
    pub fn with_token_counter(mut self, tokens: Arc<TokenCounter>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn build(self) -> Result<ConversationMemory, ChatmemError> {
        let store = self
            .store
            .ok_or_else(|| ChatmemError::Config("memory requires a turn store".to_string()))?;
        let index = self
            .index
            .ok_or_else(|| ChatmemError::Config("memory requires a similarity index".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| ChatmemError::Config("memory requires an embedder".to_string()))?;
        let tokens = match self.tokens {
            Some(tokens) => tokens,
            None => Arc::new(TokenCounter::cl100k()?),
        };

        let config = self.config;
        let target_tokens = config.compression.target_tokens;
        let compressor = Arc::new(
            ExtractiveCompressor::new(embedder.clone(), tokens.clone())
                .with_config(&config.compression),
        );
        let summarizer: Arc<dyn Summarizer> = match self.summarizer {
            Some(summarizer) => summarizer,
            None => Arc::new(ExtractiveSummarizer::new(compressor.clone(), target_tokens)),
        };

        Ok(ConversationMemory {
            recall: RecallEngine::new(store.clone(), index.clone(), embedder.clone(), &config.recall),
            chunker: Chunker::from_config(tokens, &config.chunking),
            recent_count: config.recall.recent_count,
            target_tokens,
            store,
            index,
            embedder,
            compressor,
            summarizer,
            write_lock: RwLock::new(()),
        })
    }
}

/// Conversational memory over a turn store and a similarity index.
pub struct ConversationMemory {
    store: Arc<dyn TurnStore>,
    index: Arc<dyn SimilarityIndex>,
    embedder: Arc<dyn Embedder>,
    compressor: Arc<ExtractiveCompressor>,
    summarizer: Arc<dyn Summarizer>,
    chunker: Chunker,
    recall: RecallEngine,
    recent_count: usize,
    target_tokens: usize,
    write_lock: RwLock<()>,
}

impl ConversationMemory {
    pub fn builder() -> MemoryBuilder {
        MemoryBuilder::new()
    }

    /// Open the configured database and build the configured embedder and
    /// summarizer.
    ///
    /// The ONNX embedder downloads its model on first use.
    pub async fn from_config(config: &ChatmemConfig) -> Result<Self, ChatmemError> {
        if config.embedding.provider == EmbeddingProvider::Onnx
            && config.embedding.model_name != ONNX_MODEL_NAME
        {
            return Err(ChatmemError::Config(format!(
                "unsupported onnx embedding model `{}`",
                config.embedding.model_name
            )));
        }

        let db = Database::from_config(&config.storage).await?;
        let store: Arc<dyn TurnStore> = Arc::new(SqliteTurnStore::new(db.clone()));
        let index: Arc<dyn SimilarityIndex> = Arc::new(SqliteVectorIndex::new(db));

        let embedder: Arc<dyn Embedder> = match config.embedding.provider {
            EmbeddingProvider::Onnx => {
                let manager =
                    ModelManager::new(&config.embedding.data_dir, &config.embedding.model_name);
                Arc::new(OnnxEmbedder::from_manager(&manager).await?)
            }
            EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::from_config(&config.embedding)?),
        };

        let mut builder = Self::builder()
            .with_config(config.clone())
            .with_store(store)
            .with_index(index)
            .with_embedder(embedder);
        if config.summarizer.provider == SummarizerProvider::OpenAi {
            builder = builder.with_summarizer(Arc::new(OpenAiSummarizer::from_config(
                &config.summarizer,
            )?));
        }
        builder.build()
    }

    /// Summarize `text` with the configured summarizer, falling back to
    /// extractive compression when it fails.
    pub async fn summarize(&self, text: &str) -> String {
        match self.summarizer.summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    summarizer = self.summarizer.name(),
                    error = %e,
                    "summarizer failed, falling back to extractive compression"
                );
                self.compressor.compress(text, self.target_tokens).await
            }
        }
    }

    /// Store a question/answer exchange and index its summaries.
    ///
    /// A new session id is minted when `session_id` is `None`.
    pub async fn record(
        &self,
        question: &str,
        answer: &str,
        session_id: Option<&str>,
    ) -> Result<RecordReceipt, ChatmemError> {
        let session_id = session_id
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let question_summary = self.summarize(question).await;
        let answer_summary = self.summarize(answer).await;

        let _guard = self.write_lock.write().await;
        // Stored with microsecond precision.
        let asked_at = Utc::now().trunc_subsecs(6);
        let mut answered_at = Utc::now().trunc_subsecs(6);
        if answered_at <= asked_at {
            answered_at = asked_at + Duration::microseconds(1);
        }

        let question_turn = Turn {
            session_id: session_id.clone(),
            message_id: Uuid::new_v4().to_string(),
            role: Role::Question,
            text: question.to_string(),
            summary: question_summary,
            timestamp: asked_at,
        };
        let answer_turn = Turn {
            session_id: session_id.clone(),
            message_id: Uuid::new_v4().to_string(),
            role: Role::Answer,
            text: answer.to_string(),
            summary: answer_summary,
            timestamp: answered_at,
        };

        self.store.insert(&question_turn).await?;
        self.store.insert(&answer_turn).await?;

        let mut chunks = 0;
        for turn in [&question_turn, &answer_turn] {
            match self.index_turn(turn).await {
                Ok(n) => chunks += n,
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        question_id = %question_turn.message_id,
                        answer_id = %answer_turn.message_id,
                        error = %e,
                        "turns stored but not fully indexed"
                    );
                    return Err(e);
                }
            }
        }

        debug!(session_id = %session_id, chunks, "exchange recorded");
        Ok(RecordReceipt {
            session_id,
            question_id: question_turn.message_id,
            answer_id: answer_turn.message_id,
        })
    }

    async fn index_turn(&self, turn: &Turn) -> Result<usize, ChatmemError> {
        let pieces = self.chunker.split(&turn.summary);
        let count = pieces.len();
        for sentence in pieces {
            let vector = self.embedder.embed(&sentence).await?;
            let chunk = Chunk {
                chunk_id: Uuid::new_v4().to_string(),
                sentence,
                session_id: turn.session_id.clone(),
                message_id: turn.message_id.clone(),
                role: turn.role,
            };
            self.index.upsert(&chunk, &vector).await?;
        }
        Ok(count)
    }

    /// Delete one turn and its chunks. Returns whether the turn existed.
    pub async fn forget_message(
        &self,
        session_id: &str,
        message_id: &str,
    ) -> Result<bool, ChatmemError> {
        let _guard = self.write_lock.write().await;
        let existed = self.store.delete_one(session_id, message_id).await?;
        let filter = SearchFilter::session(session_id).with_message(message_id);
        let ids = self.index.matching_ids(&filter).await?;
        let chunks = self.index.delete_batch(&ids).await?;
        debug!(session_id, message_id, existed, chunks, "message forgotten");
        Ok(existed)
    }

    /// Delete every turn and chunk of a session. Returns the turns removed.
    pub async fn forget_session(&self, session_id: &str) -> Result<u64, ChatmemError> {
        let _guard = self.write_lock.write().await;
        let turns = self.store.delete_many(session_id).await?;
        let ids = self.index.matching_ids(&SearchFilter::session(session_id)).await?;
        let chunks = self.index.delete_batch(&ids).await?;
        debug!(session_id, turns, chunks, "session forgotten");
        Ok(turns)
    }

    /// Page through a session's turns, or count them.
    pub async fn list_messages(
        &self,
        session_id: &str,
        query: &ListQuery,
    ) -> Result<Listing, ChatmemError> {
        let _guard = self.write_lock.read().await;
        if query.count {
            return Ok(Listing::Count(self.store.count(session_id).await?));
        }
        if query.limit == 0 {
            return Ok(Listing::Page(Vec::new()));
        }

        let page = query.page.max(1);
        let offset = (page - 1).saturating_mul(query.limit);
        let order = SortOrder::from_recent_first(query.recent_first);
        let turns = self.store.find(session_id, order, query.limit, offset).await?;
        debug!(session_id, page, limit = query.limit, returned = turns.len(), "messages listed");
        Ok(Listing::Page(turns))
    }

    /// The `n` most recent turns of a session, newest first when
    /// `recent_first`, otherwise in chronological order.
    pub async fn last_turns(
        &self,
        session_id: &str,
        n: usize,
        recent_first: bool,
    ) -> Result<Vec<Turn>, ChatmemError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let _guard = self.write_lock.read().await;
        let mut turns = self
            .store
            .find(session_id, SortOrder::NewestFirst, n, 0)
            .await?;
        if !recent_first {
            turns.reverse();
        }
        Ok(turns)
    }

    /// Recall context for `prompt` using the configured recency window.
    pub async fn recall(&self, session_id: &str, prompt: &str) -> Result<Recollection, ChatmemError> {
        self.recall_with(session_id, prompt, self.recent_count).await
    }

    /// Recall context for `prompt` with an explicit recency window size.
    pub async fn recall_with(
        &self,
        session_id: &str,
        prompt: &str,
        recent_count: usize,
    ) -> Result<Recollection, ChatmemError> {
        let _guard = self.write_lock.read().await;
        self.recall.recall(session_id, prompt, recent_count).await
    }

    /// Health of every collaborator, keyed by adapter name.
    pub async fn health(&self) -> Vec<(String, HealthStatus)> {
        let checks = [
            (self.store.name(), self.store.health_check().await),
            (self.index.name(), self.index.health_check().await),
            (self.embedder.name(), self.embedder.health_check().await),
            (self.summarizer.name(), self.summarizer.health_check().await),
        ];
        checks
            .into_iter()
            .map(|(name, status)| {
                let status = status.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
                (name.to_string(), status)
            })
            .collect()
    }
}

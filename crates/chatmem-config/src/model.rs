// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for chatmem.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level chatmem configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatmemConfig {
    /// Turn store and similarity index database.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Recency window and similarity search sizes.
    #[serde(default)]
    pub recall: RecallConfig,

    /// Extractive compressor settings.
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Chunking of summaries before embedding.
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Embedding service selection.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Summarizer selection.
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chatmem").join("chatmem.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chatmem.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Recall engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Number of most recent turns returned verbatim.
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,

    /// Nearest chunks requested from the similarity index.
    #[serde(default = "default_search_k")]
    pub search_k: usize,

    /// Similarity hits kept after excluding the recency window.
    #[serde(default = "default_context_hits")]
    pub context_hits: usize,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            recent_count: default_recent_count(),
            search_k: default_search_k(),
            context_hits: default_context_hits(),
        }
    }
}

fn default_recent_count() -> usize {
    4
}

fn default_search_k() -> usize {
    10
}

fn default_context_hits() -> usize {
    2
}

/// Extractive compressor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    /// Token count above which a turn's text is compressed.
    #[serde(default = "default_target_tokens")]
    pub target_tokens: usize,

    /// Number of LDA topics.
    #[serde(default = "default_num_topics")]
    pub num_topics: usize,

    /// Variational EM iterations when fitting the topic model.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Seed for topic model initialisation.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_tokens: default_target_tokens(),
            num_topics: default_num_topics(),
            max_iter: default_max_iter(),
            seed: default_seed(),
        }
    }
}

fn default_target_tokens() -> usize {
    500
}

fn default_num_topics() -> usize {
    5
}

fn default_max_iter() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

/// Chunking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk.
    #[serde(default = "default_chunk_tokens")]
    pub max_tokens: usize,

    /// Sentences repeated from the end of the previous chunk.
    #[serde(default)]
    pub overlap_sentences: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_chunk_tokens(),
            overlap_sentences: 0,
        }
    }
}

fn default_chunk_tokens() -> usize {
    300
}

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local ONNX inference (all-MiniLM-L6-v2).
    Onnx,
    /// OpenAI-compatible `/embeddings` endpoint.
    OpenAi,
}

/// Embedding service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProvider,

    /// Name of the local embedding model. Only [`ONNX_MODEL_NAME`] is
    /// downloadable; it also names the cache directory.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Directory where downloaded model files are cached.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key for the OpenAI-compatible API.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Remote embedding model name.
    #[serde(default = "default_openai_embedding_model")]
    pub openai_model: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model_name: default_model_name(),
            data_dir: default_data_dir(),
            api_base: default_api_base(),
            api_key: None,
            openai_model: default_openai_embedding_model(),
        }
    }
}

fn default_embedding_provider() -> EmbeddingProvider {
    EmbeddingProvider::Onnx
}

/// The one local model the ONNX embedder knows how to fetch and run.
pub const ONNX_MODEL_NAME: &str = "all-MiniLM-L6-v2";

fn default_model_name() -> String {
    ONNX_MODEL_NAME.to_string()
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("chatmem"))
        .unwrap_or_else(|| std::path::PathBuf::from(".chatmem"))
        .to_string_lossy()
        .into_owned()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Which summarizer to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// Built-in extractive compressor.
    Extractive,
    /// OpenAI-compatible chat completion.
    OpenAi,
}

/// Summarizer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SummarizerConfig {
    #[serde(default = "default_summarizer_provider")]
    pub provider: SummarizerProvider,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key for the OpenAI-compatible API.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat model used for summaries.
    #[serde(default = "default_summarizer_model")]
    pub model: String,

    /// Completion token cap.
    #[serde(default = "default_summary_max_tokens")]
    pub max_tokens: u32,

    /// Input is cropped to this many whitespace-separated words.
    #[serde(default = "default_max_input_words")]
    pub max_input_words: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            api_base: default_api_base(),
            api_key: None,
            model: default_summarizer_model(),
            max_tokens: default_summary_max_tokens(),
            max_input_words: default_max_input_words(),
        }
    }
}

fn default_summarizer_provider() -> SummarizerProvider {
    SummarizerProvider::Extractive
}

fn default_summarizer_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_summary_max_tokens() -> u32 {
    256
}

fn default_max_input_words() -> usize {
    1024
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

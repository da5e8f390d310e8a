// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extractive compression.
//!
//! Long text is reduced by scoring each sentence and keeping the best ones
//! that fit a word budget, in their original order. A sentence's score is
//!
//! ```text
//! 0.6 * cos(sentence embedding, document embedding)
//! + 0.3 * max(sentence topic distribution)
//! + 0.2 * lexical diversity
//! ```
//!
//! Compression never fails from the caller's point of view: any internal
//! error is logged and the original text is returned.

pub mod language;
pub mod lda;
pub mod sentences;

use std::collections::HashSet;
use std::sync::Arc;

use chatmem_config::model::CompressionConfig;
use chatmem_core::vector::cosine_similarity;
use chatmem_core::{ChatmemError, Embedder};
use tracing::{debug, warn};

use crate::tokens::TokenCounter;

pub use language::{detect_language, Language};
pub use lda::{LdaParams, TopicModel};
pub use sentences::split_sentences;

const SEMANTIC_WEIGHT: f64 = 0.6;
const TOPIC_WEIGHT: f64 = 0.3;
const LEXICAL_WEIGHT: f64 = 0.2;

/// Sentence-selecting compressor.
pub struct ExtractiveCompressor {
    embedder: Arc<dyn Embedder>,
    tokens: Arc<TokenCounter>,
    params: LdaParams,
}

impl ExtractiveCompressor {
    pub fn new(embedder: Arc<dyn Embedder>, tokens: Arc<TokenCounter>) -> Self {
        Self {
            embedder,
            tokens,
            params: LdaParams::default(),
        }
    }

    /// Use the topic-model settings from a [`CompressionConfig`].
    pub fn with_config(mut self, config: &CompressionConfig) -> Self {
        self.params = LdaParams {
            num_topics: config.num_topics,
            max_iter: config.max_iter,
            seed: config.seed,
        };
        self
    }

    pub fn token_counter(&self) -> &TokenCounter {
        &self.tokens
    }

    /// Compress `text` to roughly `target_tokens` tokens.
    ///
    /// Text already within the target is returned unchanged. The result may
    /// be empty when no sentence fits the budget.
    pub async fn compress(&self, text: &str, target_tokens: usize) -> String {
        let original = self.tokens.count(text);
        if original <= target_tokens {
            return text.to_string();
        }

        let rate = target_tokens as f64 / original as f64;
        match self.select_sentences(text, rate).await {
            Ok(compressed) => {
                debug!(
                    original_tokens = original,
                    target_tokens,
                    compressed_tokens = self.tokens.count(&compressed),
                    "text compressed"
                );
                compressed
            }
            Err(e) => {
                warn!(error = %e, "compression failed, keeping original text");
                text.to_string()
            }
        }
    }

    /// Keep the highest scoring sentences whose word count fits
    /// `floor(total_words * rate)`.
    pub async fn select_sentences(&self, text: &str, rate: f64) -> Result<String, ChatmemError> {
        let sentences = split_sentences(text);
        let stop_words = detect_language(text).stop_words();
        let model = TopicModel::fit(&sentences, stop_words, self.params)?;
        let doc_embedding = self.embedder.embed(text).await?;

        let mut scored = Vec::with_capacity(sentences.len());
        for (idx, sentence) in sentences.iter().enumerate() {
            let embedding = self.embedder.embed(sentence).await?;
            let semantic = f64::from(cosine_similarity(&embedding, &doc_embedding));
            let topical = model
                .topic_distribution(sentence)
                .into_iter()
                .fold(0.0, f64::max);
            let lexical = lexical_diversity(sentence, stop_words);
            let score =
                SEMANTIC_WEIGHT * semantic + TOPIC_WEIGHT * topical + LEXICAL_WEIGHT * lexical;
            scored.push((idx, score));
        }
        // Stable: equal scores keep document order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let total_words: usize = sentences.iter().map(|s| word_count(s)).sum();
        let target_words = (total_words as f64 * rate).floor() as usize;

        let mut accepted = Vec::new();
        let mut current_words = 0;
        for (idx, _) in scored {
            let words = word_count(&sentences[idx]);
            if current_words + words > target_words {
                break;
            }
            accepted.push(idx);
            current_words += words;
        }
        accepted.sort_unstable();

        Ok(accepted
            .into_iter()
            .map(|idx| sentences[idx].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Distinct lowercase non-stop-words over total words. Zero for empty input.
pub fn lexical_diversity(sentence: &str, stop_words: &HashSet<&str>) -> f64 {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<String> = words
        .iter()
        .map(|w| w.to_lowercase())
        .filter(|w| !stop_words.contains(w.as_str()))
        .collect();
    unique.len() as f64 / words.len() as f64
}

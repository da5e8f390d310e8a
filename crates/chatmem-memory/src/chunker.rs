// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splits a turn summary into token-bounded chunks for embedding.
//!
//! Whole sentences are packed greedily. A sentence longer than the budget
//! is broken on word boundaries first. Blank input yields a single empty
//! chunk so that every turn is represented in the index.

use std::sync::Arc;

use chatmem_config::model::ChunkingConfig;

use crate::compressor::split_sentences;
use crate::tokens::TokenCounter;

pub struct Chunker {
    tokens: Arc<TokenCounter>,
    max_tokens: usize,
    overlap_sentences: usize,
}

impl Chunker {
    pub fn new(tokens: Arc<TokenCounter>, max_tokens: usize, overlap_sentences: usize) -> Self {
        Self {
            tokens,
            max_tokens: max_tokens.max(1),
            overlap_sentences,
        }
    }

    pub fn from_config(tokens: Arc<TokenCounter>, config: &ChunkingConfig) -> Self {
        Self::new(tokens, config.max_tokens, config.overlap_sentences)
    }

    /// Split `text` into chunks of at most `max_tokens` tokens each.
    ///
    /// A single word longer than the budget becomes its own oversized chunk.
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<String> = split_sentences(text)
            .into_iter()
            .flat_map(|s| self.fit_sentence(s))
            .collect();
        if pieces.is_empty() {
            return vec![String::new()];
        }

        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for piece in pieces {
            if current.is_empty() || self.fits(&current, &piece) {
                current.push(piece);
                continue;
            }

            let carry_from = current.len().saturating_sub(self.overlap_sentences);
            let mut next: Vec<String> = current[carry_from..].to_vec();
            chunks.push(current.join(" "));
            while !next.is_empty() && !self.fits(&next, &piece) {
                next.remove(0);
            }
            next.push(piece);
            current = next;
        }
        chunks.push(current.join(" "));
        chunks
    }

    fn fits(&self, current: &[String], piece: &str) -> bool {
        let mut joined = current.join(" ");
        joined.push(' ');
        joined.push_str(piece);
        self.tokens.count(&joined) <= self.max_tokens
    }

    fn fit_sentence(&self, sentence: String) -> Vec<String> {
        if self.tokens.count(&sentence) <= self.max_tokens {
            return vec![sentence];
        }

        let mut parts = Vec::new();
        let mut current = String::new();
        for word in sentence.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if current.is_empty() || self.tokens.count(&candidate) <= self.max_tokens {
                current = candidate;
            } else {
                parts.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }
        parts
    }
}

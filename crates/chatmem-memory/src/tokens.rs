// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token counting with the `cl100k_base` encoding used by GPT-4.

use chatmem_core::ChatmemError;
use tiktoken_rs::CoreBPE;

/// Counts BPE tokens. Construct once and share.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Load the `cl100k_base` encoding.
    pub fn cl100k() -> Result<Self, ChatmemError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| ChatmemError::Internal(format!("failed to load cl100k_base: {e}")))?;
        Ok(Self { bpe })
    }

    /// Number of tokens in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tokens() {
        let counter = TokenCounter::cl100k().unwrap();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("hello world") >= 2);
        assert!(counter.count("one two three four five") > counter.count("one two"));
    }
}

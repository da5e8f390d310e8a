// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the extractive compressor and the chunker.

use std::sync::Arc;

use chatmem_memory::compressor::{split_sentences, word_count};
use chatmem_memory::{Chunker, ExtractiveCompressor, TokenCounter};
use chatmem_test_utils::{FailingEmbedder, HashingEmbedder};
use proptest::prelude::*;

const LONG_TEXT: &str = "The Amazon rainforest covers much of northern Brazil. \
    It holds an enormous share of the planet's plant species. \
    Rivers carry sediment from the Andes across the basin. \
    Farmers clear land for cattle along the southern edge. \
    Satellite images track the loss of forest every year. \
    Scientists warn that drying could turn forest into savanna. \
    Indigenous communities defend large protected territories. \
    Tourism brings visitors to lodges near Manaus. \
    The city of Manaus grew rich during the rubber boom. \
    Its opera house was built with imported European materials. \
    Today the region exports soy, beef, and minerals. \
    Conservation policy shifts with each new government.";

fn tokens() -> Arc<TokenCounter> {
    Arc::new(TokenCounter::cl100k().unwrap())
}

fn compressor() -> ExtractiveCompressor {
    ExtractiveCompressor::new(Arc::new(HashingEmbedder::new()), tokens())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[tokio::test]
async fn compression_keeps_sentences_in_document_order() {
    let original = split_sentences(LONG_TEXT);
    let compressed = compressor().compress(LONG_TEXT, 60).await;

    assert_ne!(compressed, LONG_TEXT);
    let kept = split_sentences(&compressed);
    assert!(!kept.is_empty());

    let mut cursor = 0;
    for sentence in &kept {
        let pos = original[cursor..]
            .iter()
            .position(|s| s == sentence)
            .expect("kept sentence must come from the original, in order");
        cursor += pos + 1;
    }
}

#[tokio::test]
async fn compression_respects_word_budget() {
    let compressor = compressor();
    let total_tokens = compressor.token_counter().count(LONG_TEXT);
    let target = total_tokens / 3;
    let rate = target as f64 / total_tokens as f64;

    let compressed = compressor.compress(LONG_TEXT, target).await;
    let budget = (word_count(LONG_TEXT) as f64 * rate).floor() as usize;
    assert!(word_count(&compressed) <= budget);
}

#[tokio::test]
async fn compression_is_deterministic() {
    let compressor = compressor();
    let first = compressor.compress(LONG_TEXT, 60).await;
    let second = compressor.compress(LONG_TEXT, 60).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn single_sentence_degrades_to_original() {
    let text = "word ".repeat(200);
    let text = text.trim();
    assert_eq!(compressor().compress(text, 10).await, text);
}

#[tokio::test]
async fn embedder_failure_degrades_to_original() {
    let compressor = ExtractiveCompressor::new(Arc::new(FailingEmbedder::new()), tokens());
    assert_eq!(compressor.compress(LONG_TEXT, 20).await, LONG_TEXT);
}

#[tokio::test]
async fn portuguese_text_compresses() {
    let text = "O Brasil é o maior país da América do Sul. \
        A capital do Brasil é Brasília, inaugurada em 1960. \
        São Paulo é a cidade mais populosa do país. \
        O Rio de Janeiro foi capital até a mudança para Brasília. \
        A floresta amazônica ocupa grande parte do norte. \
        O país é um grande exportador de café e soja.";
    let compressed = compressor().compress(text, 30).await;
    assert!(!compressed.is_empty());
    assert!(word_count(&compressed) < word_count(text));
}

fn sentence_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{2,8}( [a-z]{2,8}){0,10}", 1..8)
        .prop_map(|sentences| {
            sentences
                .into_iter()
                .map(|s| format!("{s}."))
                .collect::<Vec<_>>()
                .join(" ")
        })
}

/// Sentences of one fixed length drawn from single-token words, so every
/// sentence costs the same number of tokens.
fn uniform_sentences() -> impl Strategy<Value = Vec<String>> {
    const WORDS: &[&str] = &[
        "cat", "dog", "sun", "red", "big", "day", "car", "box", "man", "hot", "top", "run",
        "map", "key", "log", "tag",
    ];
    (3usize..7).prop_flat_map(|len| {
        prop::collection::vec(
            prop::collection::vec(prop::sample::select(WORDS), len)
                .prop_map(|words| format!("{}.", words.join(" "))),
            2..8,
        )
    })
}

fn assert_in_order(original: &[String], kept: &[String]) -> Result<(), TestCaseError> {
    let mut cursor = 0;
    for sentence in kept {
        let pos = original[cursor..].iter().position(|s| s == sentence);
        prop_assert!(pos.is_some(), "{:?} not found in order", sentence);
        cursor += pos.unwrap_or_default() + 1;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn text_within_target_is_unchanged(text in sentence_text(), slack in 0usize..50) {
        let compressor = compressor();
        let target = compressor.token_counter().count(&text) + slack;
        let out = runtime().block_on(compressor.compress(&text, target));
        prop_assert_eq!(out, text);
    }

    #[test]
    fn chunks_preserve_words_and_budget(text in sentence_text(), max_tokens in 4usize..40) {
        let tokens = tokens();
        let chunker = Chunker::new(tokens.clone(), max_tokens, 0);
        let chunks = chunker.split(&text);
        prop_assert!(!chunks.is_empty());

        for chunk in &chunks {
            prop_assert!(
                tokens.count(chunk) <= max_tokens || word_count(chunk) == 1,
                "chunk over budget: {:?}", chunk
            );
        }

        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);
    }

    #[test]
    fn compression_preserves_order(sentences in uniform_sentences(), fraction in 0.1f64..0.9) {
        let compressor = compressor();
        let text = sentences.join(" ");
        let target = (compressor.token_counter().count(&text) as f64 * fraction) as usize;
        let out = runtime().block_on(compressor.compress(&text, target));
        assert_in_order(&sentences, &split_sentences(&out))?;
    }

    #[test]
    fn second_pass_does_not_shrink(sentences in uniform_sentences(), fraction in 0.1f64..0.9) {
        let compressor = compressor();
        let text = sentences.join(" ");
        let target = (compressor.token_counter().count(&text) as f64 * fraction) as usize;
        let rt = runtime();
        let once = rt.block_on(compressor.compress(&text, target));
        let twice = rt.block_on(compressor.compress(&once, target));
        prop_assert_eq!(twice, once);
    }
}

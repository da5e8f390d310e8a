// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sentence segmentation.
//!
//! Splits after runs of terminal punctuation followed by whitespace, except
//! after titles and single-letter initials. Words such as "etc." or "no."
//! that also end sentences only suppress the split when the next word starts
//! in lowercase or with a digit. Each sentence is further split on line
//! breaks. Blank pieces are dropped.

use std::sync::LazyLock;

use regex::Regex;

static BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.!?…]+["'”’)\]]*\s+"#).unwrap());

/// Never end a sentence.
const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "dr", "dra", "prof", "sr", "sra", "srta", "jr", "vs", "e.g", "i.e",
    "p.ex", "nº", "av",
];

/// End a sentence unless followed by a lowercase word or a number.
const AMBIGUOUS: &[&str] = &["etc", "no", "co", "ex", "st", "inc", "ltd", "approx"];

/// Split `text` into sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in BOUNDARY.find_iter(text) {
        let candidate = &text[start..m.end()];
        let next = text[m.end()..].chars().next();
        if ends_with_abbreviation(candidate.trim_end(), next) {
            continue;
        }
        push_lines(&mut sentences, candidate);
        start = m.end();
    }
    push_lines(&mut sentences, &text[start..]);

    sentences
}

fn push_lines(out: &mut Vec<String>, sentence: &str) {
    out.extend(
        sentence
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    );
}

fn ends_with_abbreviation(piece: &str, next: Option<char>) -> bool {
    if !piece.ends_with('.') || piece.ends_with("..") {
        return false;
    }
    let word = piece
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches('.')
        .to_lowercase();

    let is_initial = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
    if is_initial || TITLES.contains(&word.as_str()) {
        return true;
    }
    AMBIGUOUS.contains(&word.as_str())
        && next.is_some_and(|c| c.is_lowercase() || c.is_ascii_digit())
}

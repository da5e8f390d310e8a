// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Latent Dirichlet Allocation fitted with batch variational Bayes.
//!
//! Sentences are turned into term-count vectors by [`CountVectorizer`]
//! (lowercased words of two or more characters, stop words removed). The
//! topic model uses symmetric priors `alpha = eta = 1 / K`, a seeded
//! initialisation, and up to 100 inner E-step iterations per document with
//! a mean-change tolerance of `1e-3`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use chatmem_core::ChatmemError;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

const MAX_DOC_ITER: usize = 100;
const MEAN_CHANGE_TOL: f64 = 1e-3;
const EPS: f64 = f64::EPSILON;

/// A sparse term-count vector: `(term index, count)` pairs.
pub type TermCounts = Vec<(usize, f64)>;

/// Fixed-vocabulary bag-of-words vectorizer.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    stop_words: HashSet<String>,
}

impl CountVectorizer {
    /// Learn the vocabulary of `docs`. Term indices follow lexical order.
    pub fn fit(docs: &[String], stop_words: &HashSet<&str>) -> Result<Self, ChatmemError> {
        let stop_words: HashSet<String> = stop_words.iter().map(|w| w.to_string()).collect();
        let terms: BTreeSet<String> = docs
            .iter()
            .flat_map(|doc| tokenize(doc, &stop_words))
            .collect();
        if terms.is_empty() {
            return Err(ChatmemError::Compression(
                "empty vocabulary; sentences may only contain stop words".into(),
            ));
        }

        let vocabulary = terms.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
        Ok(Self {
            vocabulary,
            stop_words,
        })
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Count known terms of `doc`. Unknown terms are ignored.
    pub fn transform(&self, doc: &str) -> TermCounts {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(doc, &self.stop_words) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_default() += 1.0;
            }
        }
        let mut counts: TermCounts = counts.into_iter().collect();
        counts.sort_by_key(|(idx, _)| *idx);
        counts
    }
}

fn tokenize(doc: &str, stop_words: &HashSet<String>) -> Vec<String> {
    TOKEN
        .find_iter(&doc.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| !stop_words.contains(t))
        .collect()
}

/// Topic model hyper-parameters.
#[derive(Debug, Clone, Copy)]
pub struct LdaParams {
    pub num_topics: usize,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self {
            num_topics: 5,
            max_iter: 10,
            seed: 42,
        }
    }
}

/// A fitted topic model over a set of sentences.
#[derive(Debug, Clone)]
pub struct TopicModel {
    vectorizer: CountVectorizer,
    /// Variational topic-word parameters, `K x V`.
    components: Array2<f64>,
    /// `exp(E[log beta])`, `K x V`.
    exp_topic_word: Array2<f64>,
    alpha: f64,
}

impl TopicModel {
    /// Fit the model to `sentences`.
    ///
    /// Fails on fewer than two sentences or when every token is a stop word.
    pub fn fit(
        sentences: &[String],
        stop_words: &HashSet<&str>,
        params: LdaParams,
    ) -> Result<Self, ChatmemError> {
        if sentences.len() < 2 {
            return Err(ChatmemError::Compression(format!(
                "topic model needs at least 2 sentences, got {}",
                sentences.len()
            )));
        }
        if params.num_topics == 0 {
            return Err(ChatmemError::Compression("num_topics must be at least 1".into()));
        }

        let vectorizer = CountVectorizer::fit(sentences, stop_words)?;
        let docs: Vec<TermCounts> = sentences.iter().map(|s| vectorizer.transform(s)).collect();

        let k = params.num_topics;
        let v = vectorizer.len();
        let prior = 1.0 / k as f64;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let mut components = Array2::from_shape_fn((k, v), |_| rng.gen_range(0.9..1.1));
        let mut exp_topic_word = dirichlet_expectation_2d(&components);

        for _ in 0..params.max_iter {
            // E-step
            let mut sstats = Array2::<f64>::zeros((k, v));
            for doc in &docs {
                let init = Array1::from_shape_fn(k, |_| rng.gen_range(0.9..1.1));
                let (_, exp_doc_topic) = infer_document(doc, &exp_topic_word, prior, init);
                for &(j, cnt) in doc {
                    let norm_phi = norm_phi(&exp_doc_topic, &exp_topic_word, j);
                    for t in 0..k {
                        sstats[[t, j]] += exp_doc_topic[t] * cnt / norm_phi;
                    }
                }
            }
            sstats *= &exp_topic_word;

            // M-step
            components = sstats + prior;
            exp_topic_word = dirichlet_expectation_2d(&components);
        }

        Ok(Self {
            vectorizer,
            components,
            exp_topic_word,
            alpha: prior,
        })
    }

    pub fn num_topics(&self) -> usize {
        self.components.nrows()
    }

    /// Normalised topic distribution of `text`. Sums to 1.
    pub fn topic_distribution(&self, text: &str) -> Vec<f64> {
        let k = self.num_topics();
        let doc = self.vectorizer.transform(text);
        let (gamma, _) = infer_document(&doc, &self.exp_topic_word, self.alpha, Array1::ones(k));
        let total = gamma.sum();
        if total > 0.0 {
            gamma.iter().map(|g| g / total).collect()
        } else {
            vec![1.0 / k as f64; k]
        }
    }
}

/// Variational E-step for one document.
///
/// Returns the document-topic parameters and their `exp(E[log theta])`.
fn infer_document(
    doc: &[(usize, f64)],
    exp_topic_word: &Array2<f64>,
    alpha: f64,
    mut gamma: Array1<f64>,
) -> (Array1<f64>, Array1<f64>) {
    let k = gamma.len();
    let mut exp_doc_topic = dirichlet_expectation_1d(&gamma);
    if doc.is_empty() {
        return (gamma, exp_doc_topic);
    }

    for _ in 0..MAX_DOC_ITER {
        let last = gamma.clone();
        let mut next = Array1::<f64>::zeros(k);
        for &(j, cnt) in doc {
            let weight = cnt / norm_phi(&exp_doc_topic, exp_topic_word, j);
            for t in 0..k {
                next[t] += weight * exp_topic_word[[t, j]];
            }
        }
        gamma = &exp_doc_topic * &next + alpha;
        exp_doc_topic = dirichlet_expectation_1d(&gamma);

        let mean_change = (&gamma - &last).mapv(f64::abs).mean().unwrap_or(0.0);
        if mean_change < MEAN_CHANGE_TOL {
            break;
        }
    }

    (gamma, exp_doc_topic)
}

fn norm_phi(exp_doc_topic: &Array1<f64>, exp_topic_word: &Array2<f64>, term: usize) -> f64 {
    exp_doc_topic
        .iter()
        .enumerate()
        .map(|(t, e)| e * exp_topic_word[[t, term]])
        .sum::<f64>()
        + EPS
}

fn dirichlet_expectation_1d(alpha: &Array1<f64>) -> Array1<f64> {
    let psi_total = digamma(alpha.sum());
    alpha.mapv(|a| (digamma(a) - psi_total).exp())
}

fn dirichlet_expectation_2d(alpha: &Array2<f64>) -> Array2<f64> {
    let mut out = alpha.clone();
    for mut row in out.rows_mut() {
        let psi_total = digamma(row.sum());
        row.mapv_inplace(|a| (digamma(a) - psi_total).exp());
    }
    out
}

/// Digamma function for positive arguments.
fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - f * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))))
}

// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as window sizes, non-empty paths, and remote provider credentials.

use crate::diagnostic::ConfigError;
use crate::model::{ChatmemConfig, EmbeddingProvider, SummarizerProvider, ONNX_MODEL_NAME};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ChatmemConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid("storage.database_path must not be empty"));
    }

    if config.recall.search_k == 0 {
        errors.push(invalid("recall.search_k must be at least 1"));
    }

    if config.recall.context_hits > config.recall.search_k {
        errors.push(invalid(format!(
            "recall.context_hits ({}) must not exceed recall.search_k ({})",
            config.recall.context_hits, config.recall.search_k
        )));
    }

    if config.compression.target_tokens == 0 {
        errors.push(invalid("compression.target_tokens must be at least 1"));
    }

    if config.compression.num_topics == 0 {
        errors.push(invalid("compression.num_topics must be at least 1"));
    }

    if config.chunking.max_tokens == 0 {
        errors.push(invalid("chunking.max_tokens must be at least 1"));
    }

    if config.summarizer.max_input_words == 0 {
        errors.push(invalid("summarizer.max_input_words must be at least 1"));
    }

    if config.embedding.provider == EmbeddingProvider::OpenAi
        && !has_key(config.embedding.api_key.as_deref())
    {
        errors.push(invalid(
            "embedding.api_key is required when embedding.provider = \"openai\"",
        ));
    }

    if config.embedding.provider == EmbeddingProvider::Onnx
        && config.embedding.model_name != ONNX_MODEL_NAME
    {
        errors.push(invalid(format!(
            "embedding.model_name `{}` is not supported by the onnx provider; use `{ONNX_MODEL_NAME}` or provider = \"openai\"",
            config.embedding.model_name
        )));
    }

    if config.summarizer.provider == SummarizerProvider::OpenAi
        && !has_key(config.summarizer.api_key.as_deref())
    {
        errors.push(invalid(
            "summarizer.api_key is required when summarizer.provider = \"openai\"",
        ));
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_key(key: Option<&str>) -> bool {
    key.is_some_and(|k| !k.trim().is_empty())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}

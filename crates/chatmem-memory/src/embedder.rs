// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local ONNX embedder running all-MiniLM-L6-v2 on CPU.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use chatmem_core::vector::l2_normalize;
use chatmem_core::{AdapterType, ChatmemError, Embedder, HealthStatus, PluginAdapter};

use crate::model_manager::ModelManager;

/// Embedding width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Mean-pooled, L2-normalised sentence embeddings from an ONNX model.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// Session access is serialized by the Mutex; encoding with the tokenizer is read-only.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Load `model.onnx` and the sibling `tokenizer.json`.
    pub fn new(model_path: &Path) -> Result<Self, ChatmemError> {
        let model_dir = model_path
            .parent()
            .ok_or_else(|| ChatmemError::Internal("invalid model path".to_string()))?;

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            ChatmemError::Internal(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(|e| ChatmemError::Internal(format!("failed to create ONNX session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ChatmemError::Internal(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(1)
            .map_err(|e| ChatmemError::Internal(format!("failed to set thread count: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                ChatmemError::Internal(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Download the model if needed, then load it.
    pub async fn from_manager(manager: &ModelManager) -> Result<Self, ChatmemError> {
        let model_path = manager.ensure_model().await?;
        Self::new(&model_path)
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, ChatmemError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ChatmemError::embedder(format!("tokenization failed: {e}")))?;

        let to_i64 = |xs: &[u32]| xs.iter().map(|&x| i64::from(x)).collect::<Vec<i64>>();
        let input_ids = to_i64(encoding.get_ids());
        let attention_mask = to_i64(encoding.get_attention_mask());
        let token_type_ids = to_i64(encoding.get_type_ids());
        let seq_len = input_ids.len();

        let tensor = |data: Vec<i64>| {
            Array2::from_shape_vec((1, seq_len), data)
                .map_err(|e| ChatmemError::embedder(format!("failed to shape input tensor: {e}")))
        };
        let input_ids_array = tensor(input_ids)?;
        let attention_mask_array = tensor(attention_mask.clone())?;
        let token_type_ids_array = tensor(token_type_ids)?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| ChatmemError::embedder(format!("ONNX session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => TensorRef::from_array_view(&input_ids_array).map_err(bind_err)?,
                "attention_mask" => TensorRef::from_array_view(&attention_mask_array).map_err(bind_err)?,
                "token_type_ids" => TensorRef::from_array_view(&token_type_ids_array).map_err(bind_err)?
            ])
            .map_err(|e| ChatmemError::embedder(format!("ONNX inference failed: {e}")))?;

        // Output shape: [1, seq_len, hidden]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ChatmemError::embedder(format!("failed to read output tensor: {e}")))?;
        let hidden_size = shape[shape.len() - 1] as usize;

        let pooled = mean_pool_with_attention(data, &attention_mask, seq_len, hidden_size);
        Ok(l2_normalize(&pooled))
    }
}

fn bind_err(e: impl std::fmt::Display) -> ChatmemError {
    ChatmemError::embedder(format!("failed to bind input tensor: {e}"))
}

/// Average token embeddings whose attention mask is set.
fn mean_pool_with_attention(
    embeddings: &[f32],
    attention_mask: &[i64],
    seq_len: usize,
    hidden_size: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_size];
    let mut count = 0.0f32;

    for (i, &mask) in attention_mask.iter().enumerate().take(seq_len) {
        if mask > 0 {
            let row = &embeddings[i * hidden_size..(i + 1) * hidden_size];
            for (acc, v) in sum.iter_mut().zip(row) {
                *acc += v;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for val in &mut sum {
            *val /= count;
        }
    }
    sum
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "onnx-embedder"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatmemError> {
        match self.session.lock() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("session lock poisoned: {e}"))),
        }
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ChatmemError> {
        self.embed_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_skips_padding() {
        let embeddings = vec![
            0.0, 0.0, 0.0, // padding
            1.0, 2.0, 3.0,
        ];
        let result = mean_pool_with_attention(&embeddings, &[0, 1], 2, 3);
        assert_eq!(result, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn mean_pool_averages_tokens() {
        let embeddings = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let result = mean_pool_with_attention(&embeddings, &[1, 1, 1], 3, 2);
        assert!((result[0] - 3.0).abs() < f32::EPSILON);
        assert!((result[1] - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn mean_pool_all_masked_is_zero() {
        let result = mean_pool_with_attention(&[1.0, 1.0], &[0], 1, 2);
        assert_eq!(result, vec![0.0, 0.0]);
    }

    #[test]
    fn missing_tokenizer_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxEmbedder::new(&dir.path().join("model.onnx"));
        assert!(result.is_err());
    }
}

// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! First-use download of the local embedding model.
//!
//! Fetches the quantized all-MiniLM-L6-v2 ONNX model and its tokenizer from
//! HuggingFace into `<data_dir>/models/<model_name>/`. Configuration
//! validation rejects any other model name for the ONNX provider.

use std::path::{Path, PathBuf};

use chatmem_core::ChatmemError;
use tokio::sync::OnceCell;
use tracing::info;

const MODEL_URL: &str =
    "https://huggingface.co/onnx-community/all-MiniLM-L6-v2-ONNX/resolve/main/onnx/model_quantized.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Resolves model file paths and downloads them once.
pub struct ModelManager {
    data_dir: PathBuf,
    model_name: String,
    ready: OnceCell<PathBuf>,
}

impl ModelManager {
    pub fn new(data_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            model_name: model_name.into(),
            ready: OnceCell::new(),
        }
    }

    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("models").join(&self.model_name)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join("model.onnx")
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir().join("tokenizer.json")
    }

    /// True if both model and tokenizer files exist.
    pub fn is_model_available(&self) -> bool {
        self.model_path().exists() && self.tokenizer_path().exists()
    }

    /// Download missing files and return the model path.
    ///
    /// Concurrent callers share a single download.
    pub async fn ensure_model(&self) -> Result<PathBuf, ChatmemError> {
        self.ready
            .get_or_try_init(|| self.download_missing())
            .await
            .cloned()
    }

    async fn download_missing(&self) -> Result<PathBuf, ChatmemError> {
        if self.is_model_available() {
            return Ok(self.model_path());
        }

        info!(model = %self.model_name, "embedding model not found, downloading");

        let model_dir = self.model_dir();
        tokio::fs::create_dir_all(&model_dir).await.map_err(|e| {
            ChatmemError::Internal(format!("failed to create {}: {e}", model_dir.display()))
        })?;

        for (filename, url) in [("model.onnx", MODEL_URL), ("tokenizer.json", TOKENIZER_URL)] {
            let dest = model_dir.join(filename);
            if dest.exists() {
                continue;
            }

            info!(file = filename, "downloading");
            match download_file(url, &dest).await {
                Ok(size) => info!(file = filename, bytes = size, "downloaded"),
                Err(e) => {
                    let _ = tokio::fs::remove_file(&dest).await;
                    return Err(e);
                }
            }
        }

        info!(path = %model_dir.display(), "embedding model ready");
        Ok(self.model_path())
    }
}

async fn download_file(url: &str, dest: &Path) -> Result<usize, ChatmemError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ChatmemError::Internal(format!("failed to download {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(ChatmemError::Internal(format!(
            "download failed with status {}: {url}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ChatmemError::Internal(format!("failed to read body from {url}: {e}")))?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|e| ChatmemError::Internal(format!("failed to write {}: {e}", dest.display())))?;

    Ok(bytes.len())
}

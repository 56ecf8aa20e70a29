//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `newsvec-core` using fastembed's
//! BGESmallENV15 model (384 dimensions) with ONNX runtime inference.

use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use newsvec_core::embedding::embedder::Embedder;
use newsvec_types::error::EmbedError;

/// BGESmallENV15 embedding dimension.
pub const FASTEMBED_DIMENSION: usize = 384;

const MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Local embedder running the model on the blocking thread pool.
///
/// `TextEmbedding::embed` needs `&mut self`, so calls are serialised
/// through a mutex.
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
}

impl FastEmbedEmbedder {
    /// Load the model, downloading it into the fastembed cache on first use.
    pub fn new() -> Result<Self, EmbedError> {
        let options =
            TextInitOptions::new(EmbeddingModel::BGESmallENV15).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbedError::Model(format!("failed to load {MODEL_NAME}: {e}")))?;
        Ok(Self {
            model: Arc::new(Mutex::new(model)),
        })
    }
}

impl Embedder for FastEmbedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| EmbedError::Model("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| EmbedError::Model(e.to_string()))
        })
        .await
        .map_err(|e| EmbedError::Model(format!("embedding task failed: {e}")))?
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        FASTEMBED_DIMENSION
    }
}

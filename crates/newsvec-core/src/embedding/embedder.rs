//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for the embedding backend the pipeline calls once
//! per batch. Implementations (HTTP service, local model) live in
//! newsvec-infra.

use newsvec_types::error::EmbedError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in newsvec-infra.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// On success returns one vector per input text, in input order. A
    /// failure applies to the whole batch.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send;

    /// The model name used for embeddings (e.g., "text-embedding-3-small").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}

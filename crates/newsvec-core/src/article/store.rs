//! Vector store port for article embeddings.
//!
//! Implementations (LanceDB) live in newsvec-infra.

use newsvec_types::article::{ArticleRecord, Neighbor};
use newsvec_types::embedding::EmbeddingMatrix;
use newsvec_types::error::StoreError;

/// Article metadata stored next to its embedding, searchable by distance.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ArticleStore: Send + Sync {
    /// Store `records`, row `i` of `vectors` belonging to `records[i]`.
    ///
    /// Fails with [`StoreError::Misaligned`] when the counts differ.
    fn add(
        &self,
        records: &[ArticleRecord],
        vectors: &EmbeddingMatrix,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Fetch stored records by id. Unknown ids are skipped.
    fn get(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<ArticleRecord>, StoreError>> + Send;

    /// The `top_k` nearest articles to `vector`, ascending by distance.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Neighbor>, StoreError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Drop every stored article.
    fn reset(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

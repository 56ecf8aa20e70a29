//! Content-based recommendation: nearest stored articles to a query.

use std::sync::Arc;

use tracing::debug;

use newsvec_types::article::Recommendation;
use newsvec_types::error::{ConfigError, RecommendError};

use super::store::ArticleStore;
use super::text::article_text;
use crate::embedding::embedder::Embedder;
use crate::embedding::pipeline::EmbeddingPipeline;

pub const DEFAULT_TOP_K: usize = 5;

pub struct RecommendationService<E, S> {
    pipeline: Arc<EmbeddingPipeline<E>>,
    store: Arc<S>,
}

impl<E: Embedder + 'static, S: ArticleStore> RecommendationService<E, S> {
    pub fn new(pipeline: Arc<EmbeddingPipeline<E>>, store: Arc<S>) -> Self {
        Self { pipeline, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model_name(&self) -> &str {
        self.pipeline.embedder().model_name()
    }

    /// Recommend the `top_k` articles closest to a stored article.
    ///
    /// The queried article is part of the candidate set, so it usually
    /// comes back first with a distance near zero.
    pub async fn recommend(
        &self,
        article_id: &str,
        top_k: usize,
    ) -> Result<Recommendation, RecommendError> {
        check_top_k(top_k)?;

        let record = self
            .store
            .get(&[article_id.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RecommendError::NotFound(article_id.to_string()))?;
        if let Some(field) = record.missing_text_field() {
            return Err(RecommendError::MalformedRecord {
                id: article_id.to_string(),
                field,
            });
        }

        let vector = self.encode_query(article_text(&record)).await?;
        let neighbors = self.store.query(&vector, top_k).await?;
        debug!(article_id, found = neighbors.len(), "recommendation query done");
        Ok(Recommendation::from_neighbors(article_id, neighbors))
    }

    /// Recommend articles for a free-text preference such as "climate policy".
    ///
    /// The text is embedded as typed, without the lowercasing applied to
    /// stored article text.
    pub async fn recommend_for_text(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Recommendation, RecommendError> {
        check_top_k(top_k)?;

        let vector = self.encode_query(text.to_string()).await?;
        let neighbors = self.store.query(&vector, top_k).await?;
        Ok(Recommendation::from_neighbors(text, neighbors))
    }

    async fn encode_query(&self, text: String) -> Result<Vec<f32>, RecommendError> {
        let output = self.pipeline.encode(&[text]).await?;
        output
            .vectors
            .into_rows()
            .into_iter()
            .next()
            .ok_or(RecommendError::EmbeddingFailed)
    }
}

fn check_top_k(top_k: usize) -> Result<(), ConfigError> {
    if top_k == 0 {
        return Err(ConfigError::ZeroTopK);
    }
    Ok(())
}

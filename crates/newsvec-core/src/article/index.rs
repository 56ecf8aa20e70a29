//! Indexing job: embed article texts and store the successful ones.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use newsvec_types::article::{ArticleRecord, IndexReport};
use newsvec_types::error::IndexError;

use super::store::ArticleStore;
use super::text::article_text;
use crate::embedding::embedder::Embedder;
use crate::embedding::pipeline::EmbeddingPipeline;

pub struct IndexingService<E, S> {
    pipeline: Arc<EmbeddingPipeline<E>>,
    store: Arc<S>,
}

impl<E: Embedder + 'static, S: ArticleStore> IndexingService<E, S> {
    pub fn new(pipeline: Arc<EmbeddingPipeline<E>>, store: Arc<S>) -> Self {
        Self { pipeline, store }
    }

    pub async fn index(&self, records: &[ArticleRecord]) -> Result<IndexReport, IndexError> {
        self.index_with_cancel(records, &CancellationToken::new())
            .await
    }

    /// Embed and store `records`.
    ///
    /// Articles whose batch failed are left out of the store and listed in
    /// the report. Stored records stay aligned with the matrix rows because
    /// both are filtered by the same success flags.
    pub async fn index_with_cancel(
        &self,
        records: &[ArticleRecord],
        cancel: &CancellationToken,
    ) -> Result<IndexReport, IndexError> {
        let texts: Vec<String> = records.iter().map(article_text).collect();
        let output = self.pipeline.encode_with_cancel(&texts, cancel).await?;

        let mut stored = Vec::with_capacity(output.succeeded());
        let mut failed_ids = Vec::new();
        for (record, ok) in records.iter().zip(&output.success_flags) {
            if *ok {
                stored.push(record.clone());
            } else {
                failed_ids.push(record.article_id.clone());
            }
        }

        if !stored.is_empty() {
            self.store.add(&stored, &output.vectors).await?;
        }
        if !failed_ids.is_empty() {
            warn!(failed = failed_ids.len(), "some articles were not indexed");
        }
        info!(total = records.len(), indexed = stored.len(), "indexing finished");

        Ok(IndexReport {
            total: records.len(),
            indexed: stored.len(),
            failed_ids,
            cancelled: output.cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use newsvec_types::config::PipelineConfig;

    use super::*;
    use crate::testing::{InMemoryStore, ScriptedEmbedder, article};

    fn service(
        embedder: ScriptedEmbedder,
    ) -> (Arc<InMemoryStore>, IndexingService<ScriptedEmbedder, InMemoryStore>) {
        let config = PipelineConfig {
            batch_size: NonZeroUsize::new(5).unwrap(),
            calls_per_second: 20.0,
            max_concurrency: 2,
            call_timeout_secs: None,
        };
        let pipeline = EmbeddingPipeline::new(Arc::new(embedder), config).unwrap();
        let store = Arc::new(InMemoryStore::default());
        (Arc::clone(&store), IndexingService::new(Arc::new(pipeline), store))
    }

    fn articles(n: usize) -> Vec<ArticleRecord> {
        (0..n)
            .map(|i| article(&format!("a{i}"), &format!("Story {i}")))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_is_left_out_of_the_store() {
        let (store, service) = service(ScriptedEmbedder::new(4).failing_on("story 5"));
        let records = articles(12);

        let report = service.index(&records).await.unwrap();

        assert_eq!(report.total, 12);
        assert_eq!(report.indexed, 7);
        assert_eq!(report.failed_ids, vec!["a5", "a6", "a7", "a8", "a9"]);
        assert!(!report.cancelled);
        assert_eq!(store.count().await.unwrap(), 7);

        let found = store
            .get(&["a6".to_string(), "a10".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].article_id, "a10");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_vectors_belong_to_their_records() {
        let (store, service) = service(ScriptedEmbedder::new(4).failing_on("story 1\n"));
        let records = articles(8);
        service.index(&records).await.unwrap();

        // Querying with an article's own text finds that article first.
        let probe = crate::testing::text_vector(&article_text(&records[6]), 4);
        let neighbors = store.query(&probe, 1).await.unwrap();
        assert_eq!(neighbors[0].article_id, "a6");
        assert_eq!(neighbors[0].distance, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_dataset_stores_nothing() {
        let (store, service) = service(ScriptedEmbedder::new(4));
        let report = service.index(&[]).await.unwrap();

        assert_eq!(report, IndexReport::default());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_run_reports_every_article_as_failed() {
        let (store, service) = service(ScriptedEmbedder::new(4));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = service
            .index_with_cancel(&articles(6), &cancel)
            .await
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.indexed, 0);
        assert_eq!(report.failed_ids.len(), 6);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}

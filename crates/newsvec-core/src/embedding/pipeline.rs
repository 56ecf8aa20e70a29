//! EmbeddingPipeline -- the job-level entry point.
//!
//! Owns a caller-constructed embedder handle and the pipeline settings, and
//! runs batcher -> dispatcher -> aggregator for each job.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span};

use newsvec_types::config::PipelineConfig;
use newsvec_types::embedding::{BatchProgress, EmbeddingJobOutput};
use newsvec_types::error::PipelineError;

use super::aggregator::aggregate;
use super::batcher::batches;
use super::dispatcher::Dispatcher;
use super::embedder::Embedder;

/// Batched, rate-limited text-to-embedding pipeline.
///
/// Jobs are independent: the pipeline keeps no state between `encode` calls
/// besides its configuration and the embedder handle.
pub struct EmbeddingPipeline<E> {
    embedder: Arc<E>,
    config: PipelineConfig,
    dispatcher: Dispatcher,
}

impl<E: Embedder + 'static> EmbeddingPipeline<E> {
    /// Create a pipeline over `embedder`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
    pub fn new(embedder: Arc<E>, config: PipelineConfig) -> Result<Self, PipelineError> {
        let dispatcher = Dispatcher::new(&config)?;
        Ok(Self {
            embedder,
            config,
            dispatcher,
        })
    }

    /// Report progress after every finished batch.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        self.dispatcher = self.dispatcher.with_progress(Arc::new(progress));
        self
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Embed every text, tolerating per-batch failures.
    pub async fn encode(&self, texts: &[String]) -> Result<EmbeddingJobOutput, PipelineError> {
        self.encode_with_cancel(texts, &CancellationToken::new()).await
    }

    /// Like [`encode`](Self::encode), stopping early when `cancel` fires.
    ///
    /// Batches finished before cancellation keep their vectors; the rest are
    /// flagged as failed and the output has `cancelled` set.
    pub async fn encode_with_cancel(
        &self,
        texts: &[String],
        cancel: &CancellationToken,
    ) -> Result<EmbeddingJobOutput, PipelineError> {
        if texts.is_empty() {
            return Ok(EmbeddingJobOutput::default());
        }

        let batch_size = self.config.batch_size;
        let span = info_span!(
            "embedding.job",
            embedding.model = self.embedder.model_name(),
            embedding.items = texts.len(),
            embedding.batch_size = batch_size.get(),
            embedding.batches = texts.len().div_ceil(batch_size.get()),
        );

        async {
            let outcomes = self
                .dispatcher
                .dispatch(Arc::clone(&self.embedder), batches(texts, batch_size), cancel)
                .await;
            let output = aggregate(outcomes, texts.len(), cancel.is_cancelled())?;
            info!(
                succeeded = output.succeeded(),
                failed = output.len() - output.succeeded(),
                cancelled = output.cancelled,
                "embedding job finished"
            );
            Ok::<_, PipelineError>(output)
        }
        .instrument(span)
        .await
    }
}

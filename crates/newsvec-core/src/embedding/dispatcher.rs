//! Rate-limited dispatch of batches to the embedding backend.
//!
//! The submission loop is sequential: it waits for the pacing interval,
//! spawns one task per batch, and moves on. A semaphore bounds how many
//! backend calls are in flight. Results are collected by awaiting the task
//! handles in submission order, so output order never depends on which call
//! finishes first.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use newsvec_types::config::PipelineConfig;
use newsvec_types::embedding::{BatchFailure, BatchProgress};
use newsvec_types::error::ConfigError;

use super::batcher::Batches;
use super::embedder::Embedder;

/// Callback invoked each time a batch finishes.
pub type ProgressFn = Arc<dyn Fn(BatchProgress) + Send + Sync>;

/// What one batch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    /// One vector per text, in batch order.
    Embedded(Vec<Vec<f32>>),
    Failed(BatchFailure),
}

/// Index-tagged result of one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub index: usize,
    pub offset: usize,
    pub len: usize,
    pub result: BatchResult,
}

/// Submits batches under a start-rate cap and an in-flight cap.
pub struct Dispatcher {
    interval: Duration,
    permits: Arc<Semaphore>,
    call_timeout: Option<Duration>,
    progress: Option<ProgressFn>,
}

impl Dispatcher {
    pub fn new(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            interval: config.submission_interval(),
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
            call_timeout: config.call_timeout(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run every batch and return one outcome per batch, in batch order.
    ///
    /// Once `cancel` fires, unsubmitted batches and in-flight calls resolve
    /// to [`BatchFailure::Cancelled`]; finished batches keep their vectors.
    pub async fn dispatch<E: Embedder + 'static>(
        &self,
        embedder: Arc<E>,
        batches: Batches<'_>,
        cancel: &CancellationToken,
    ) -> Vec<BatchOutcome> {
        let tracker = Arc::new(ProgressTracker::new(batches.len(), self.progress.clone()));
        let mut pacer = self.pacer();
        let mut submitted: Vec<(usize, usize, usize, JoinHandle<BatchResult>)> =
            Vec::with_capacity(batches.len());
        let mut outcomes = Vec::with_capacity(batches.len());

        for batch in batches {
            if !cancel.is_cancelled() {
                if let Some(pacer) = pacer.as_mut() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {}
                        _ = pacer.tick() => {}
                    }
                }
            }

            if cancel.is_cancelled() {
                tracker.record(true);
                outcomes.push(BatchOutcome {
                    index: batch.index,
                    offset: batch.offset,
                    len: batch.len(),
                    result: BatchResult::Failed(BatchFailure::Cancelled),
                });
                continue;
            }

            debug!(batch = batch.index, offset = batch.offset, size = batch.len(), "submitting batch");

            let unit = Unit {
                embedder: Arc::clone(&embedder),
                texts: batch.texts.to_vec(),
                permits: Arc::clone(&self.permits),
                call_timeout: self.call_timeout,
                cancel: cancel.clone(),
            };
            let tracker = Arc::clone(&tracker);
            let handle = tokio::spawn(async move {
                let result = unit.run().await;
                tracker.record(matches!(result, BatchResult::Failed(_)));
                result
            });
            submitted.push((batch.index, batch.offset, batch.len(), handle));
        }

        let mut collected = Vec::with_capacity(submitted.len());
        for (index, offset, len, handle) in submitted {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) => {
                    tracker.record(true);
                    BatchResult::Failed(BatchFailure::Panicked {
                        message: join_error.to_string(),
                    })
                }
            };
            if let BatchResult::Failed(reason) = &result {
                warn!(batch = index, offset, size = len, %reason, "embedding batch failed");
            }
            collected.push(BatchOutcome {
                index,
                offset,
                len,
                result,
            });
        }

        // Skipped (cancelled) batches always come after every submitted one.
        collected.extend(outcomes);
        collected
    }

    fn pacer(&self) -> Option<Interval> {
        if self.interval.is_zero() {
            return None;
        }
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(interval)
    }
}

/// Everything one spawned task needs to embed one batch.
struct Unit<E> {
    embedder: Arc<E>,
    texts: Vec<String>,
    permits: Arc<Semaphore>,
    call_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl<E: Embedder> Unit<E> {
    async fn run(self) -> BatchResult {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => BatchResult::Failed(BatchFailure::Cancelled),
            result = self.call() => result,
        }
    }

    async fn call(&self) -> BatchResult {
        let Ok(_permit) = self.permits.acquire().await else {
            return BatchResult::Failed(BatchFailure::Cancelled);
        };

        let response = match self.call_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.embedder.embed(&self.texts)).await {
                    Ok(response) => response,
                    Err(_) => return BatchResult::Failed(BatchFailure::Timeout { after: limit }),
                }
            }
            None => self.embedder.embed(&self.texts).await,
        };

        match response {
            Ok(vectors) if vectors.len() == self.texts.len() => BatchResult::Embedded(vectors),
            Ok(vectors) => BatchResult::Failed(BatchFailure::LengthMismatch {
                expected: self.texts.len(),
                actual: vectors.len(),
            }),
            Err(e) => BatchResult::Failed(BatchFailure::Remote {
                message: e.to_string(),
            }),
        }
    }
}

struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    callback: Option<ProgressFn>,
}

impl ProgressTracker {
    fn new(total: usize, callback: Option<ProgressFn>) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            callback,
        }
    }

    fn record(&self, failed: bool) {
        let Some(callback) = &self.callback else {
            return;
        };
        let failed = if failed {
            self.failed.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.failed.load(Ordering::SeqCst)
        };
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        callback(BatchProgress {
            completed,
            total: self.total,
            failed,
        });
    }
}

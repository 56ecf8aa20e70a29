//! Test doubles shared by the core unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use newsvec_types::article::{ArticleRecord, Neighbor};
use newsvec_types::embedding::EmbeddingMatrix;
use newsvec_types::error::{EmbedError, StoreError};

use crate::article::store::ArticleStore;
use crate::embedding::embedder::Embedder;

/// Deterministic vector for `text`: every text maps to a distinct vector.
pub(crate) fn text_vector(text: &str, dim: usize) -> Vec<f32> {
    let seed = text
        .bytes()
        .fold(7u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    (0..dim)
        .map(|j| ((seed.wrapping_add(j as u32 * 977)) % 1000) as f32 / 1000.0)
        .collect()
}

pub(crate) fn texts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("text {i}")).collect()
}

/// Embedder whose behavior is scripted by markers in the batch texts.
///
/// A batch fails, returns too few vectors, or returns vectors of another
/// dimension when any of its texts contains the matching marker.
pub(crate) struct ScriptedEmbedder {
    dimension: usize,
    fail_marker: Option<String>,
    short_marker: Option<String>,
    wrong_dim: Option<(String, usize)>,
    delay: Duration,
    delay_for: HashMap<String, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    starts: Mutex<Vec<Instant>>,
}

impl ScriptedEmbedder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail_marker: None,
            short_marker: None,
            wrong_dim: None,
            delay: Duration::ZERO,
            delay_for: HashMap::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            starts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing_on(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub(crate) fn short_on(mut self, marker: &str) -> Self {
        self.short_marker = Some(marker.to_string());
        self
    }

    pub(crate) fn wrong_dimension_on(mut self, marker: &str, dimension: usize) -> Self {
        self.wrong_dim = Some((marker.to_string(), dimension));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Delay only the batch whose first text is `text`.
    pub(crate) fn with_delay_for(mut self, text: &str, delay: Duration) -> Self {
        self.delay_for.insert(text.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn call_starts(&self) -> Vec<Instant> {
        self.starts.lock().unwrap().clone()
    }

    fn batch_has(texts: &[String], marker: &Option<String>) -> bool {
        marker
            .as_deref()
            .is_some_and(|m| texts.iter().any(|t| t.contains(m)))
    }
}

impl Embedder for ScriptedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.starts.lock().unwrap().push(Instant::now());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = texts
            .first()
            .and_then(|t| self.delay_for.get(t))
            .copied()
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if Self::batch_has(texts, &self.fail_marker) {
            return Err(EmbedError::Status {
                status: 503,
                body: "scripted failure".to_string(),
            });
        }

        let dimension = match &self.wrong_dim {
            Some((marker, dim)) if texts.iter().any(|t| t.contains(marker.as_str())) => *dim,
            _ => self.dimension,
        };
        let mut vectors: Vec<Vec<f32>> = texts.iter().map(|t| text_vector(t, dimension)).collect();
        if Self::batch_has(texts, &self.short_marker) {
            vectors.pop();
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Brute-force in-memory store ranking by squared L2 distance.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    rows: Mutex<Vec<(ArticleRecord, Vec<f32>)>>,
}

impl InMemoryStore {
    pub(crate) fn with_articles(articles: Vec<(ArticleRecord, Vec<f32>)>) -> Self {
        Self {
            rows: Mutex::new(articles),
        }
    }
}

impl ArticleStore for InMemoryStore {
    async fn add(
        &self,
        records: &[ArticleRecord],
        vectors: &EmbeddingMatrix,
    ) -> Result<(), StoreError> {
        if records.len() != vectors.rows() {
            return Err(StoreError::Misaligned {
                records: records.len(),
                rows: vectors.rows(),
            });
        }
        let mut rows = self.rows.lock().unwrap();
        for (record, vector) in records.iter().zip(vectors.iter_rows()) {
            rows.push((record.clone(), vector.to_vec()));
        }
        Ok(())
    }

    async fn get(&self, ids: &[String]) -> Result<Vec<ArticleRecord>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(r, _)| ids.contains(&r.article_id))
            .map(|(r, _)| r.clone())
            .collect())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Neighbor>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut neighbors: Vec<Neighbor> = rows
            .iter()
            .map(|(record, stored)| Neighbor {
                article_id: record.article_id.clone(),
                metadata: record.clone(),
                distance: stored
                    .iter()
                    .zip(vector)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum(),
            })
            .collect();
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(top_k);
        Ok(neighbors)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}

pub(crate) fn article(id: &str, headline: &str) -> ArticleRecord {
    ArticleRecord {
        article_id: id.to_string(),
        uri: format!("nyt://article/{id}"),
        headline: headline.to_string(),
        abstract_text: format!("Abstract of {headline}"),
        lead_paragraph: format!("Lead paragraph of {headline}"),
    }
}

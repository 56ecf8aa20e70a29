//! LanceDB-backed [`ArticleStore`].
//!
//! One table (default `articles`) holds the article metadata columns next to
//! a fixed-size vector column. Nearest-neighbor search uses L2 distance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use newsvec_core::article::store::ArticleStore;
use newsvec_types::article::{ArticleRecord, Neighbor};
use newsvec_types::embedding::EmbeddingMatrix;
use newsvec_types::error::StoreError;

use super::lance::LanceVectorStore;
use super::schema::article_schema;

pub struct LanceArticleStore {
    store: LanceVectorStore,
    table_name: String,
    dimension: usize,
    schema: Arc<Schema>,
}

impl LanceArticleStore {
    /// Open (or create) the store at `path` for vectors of `dimension` components.
    pub async fn open(
        path: PathBuf,
        table_name: impl Into<String>,
        dimension: usize,
    ) -> Result<Self, StoreError> {
        let width = i32::try_from(dimension).map_err(|_| StoreError::Dimension {
            expected: i32::MAX as usize,
            actual: dimension,
        })?;
        let store = LanceVectorStore::new(path)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open vector store: {e}")))?;
        Ok(Self {
            store,
            table_name: table_name.into(),
            dimension,
            schema: Arc::new(article_schema(width)),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_table(&self) -> Result<lancedb::Table, StoreError> {
        self.store
            .ensure_table(&self.table_name, Arc::clone(&self.schema))
            .await
            .map_err(|e| StoreError::Query(format!("Failed to ensure article table: {e}")))
    }

    async fn existing_table(&self) -> Result<Option<lancedb::Table>, StoreError> {
        self.store
            .open_table(&self.table_name)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to open article table: {e}")))
    }

    fn check_dimension(&self, actual: usize) -> Result<(), StoreError> {
        if actual != self.dimension {
            return Err(StoreError::Dimension {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }

    fn build_record_batch(
        &self,
        records: &[ArticleRecord],
        vectors: &EmbeddingMatrix,
    ) -> Result<RecordBatch, StoreError> {
        let values = Float32Array::from(vectors.as_slice().to_vec());
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.dimension as i32,
            Arc::new(values),
            None,
        )
        .map_err(|e| StoreError::Query(format!("Failed to build vector column: {e}")))?;

        RecordBatch::try_new(
            Arc::clone(&self.schema),
            vec![
                string_array(records.iter().map(|r| r.article_id.as_str())),
                string_array(records.iter().map(|r| r.uri.as_str())),
                string_array(records.iter().map(|r| r.headline.as_str())),
                string_array(records.iter().map(|r| r.abstract_text.as_str())),
                string_array(records.iter().map(|r| r.lead_paragraph.as_str())),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| StoreError::Query(format!("Failed to build record batch: {e}")))
    }
}

fn string_array<'a>(values: impl Iterator<Item = &'a str>) -> Arc<dyn Array> {
    Arc::new(StringArray::from_iter_values(values))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::Query(format!("column '{name}' missing or not a string")))
}

/// Parse the metadata columns of `batch` into records.
fn batch_to_records(batch: &RecordBatch) -> Result<Vec<ArticleRecord>, StoreError> {
    let article_id = string_column(batch, "article_id")?;
    let uri = string_column(batch, "uri")?;
    let headline = string_column(batch, "headline")?;
    let abstract_text = string_column(batch, "abstract")?;
    let lead_paragraph = string_column(batch, "lead_paragraph")?;

    Ok((0..batch.num_rows())
        .map(|i| ArticleRecord {
            article_id: article_id.value(i).to_string(),
            uri: uri.value(i).to_string(),
            headline: headline.value(i).to_string(),
            abstract_text: abstract_text.value(i).to_string(),
            lead_paragraph: lead_paragraph.value(i).to_string(),
        })
        .collect())
}

/// Keep only the last occurrence of each `article_id`, with its vector.
fn last_per_id(
    records: &[ArticleRecord],
    vectors: &EmbeddingMatrix,
) -> Result<(Vec<ArticleRecord>, EmbeddingMatrix), StoreError> {
    let mut last: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        last.insert(record.article_id.as_str(), i);
    }
    let mut keep: Vec<usize> = last.into_values().collect();
    keep.sort_unstable();

    let mut kept_records = Vec::with_capacity(keep.len());
    let mut kept_vectors = EmbeddingMatrix::empty();
    for i in keep {
        kept_records.push(records[i].clone());
        let row = vectors.row(i).ok_or(StoreError::Misaligned {
            records: records.len(),
            rows: vectors.rows(),
        })?;
        kept_vectors
            .push_row(row)
            .map_err(|m| StoreError::Dimension {
                expected: m.expected,
                actual: m.actual,
            })?;
    }
    Ok((kept_records, kept_vectors))
}

/// SQL string literal for a LanceDB filter.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl ArticleStore for LanceArticleStore {
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
        if records.is_empty() {
            return Ok(());
        }
        self.check_dimension(vectors.dim())?;

        let table = self.ensure_table().await?;
        let (records, vectors) = last_per_id(records, vectors)?;
        let batch = self.build_record_batch(&records, &vectors)?;
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        // Upsert keyed on article_id; re-indexing replaces existing rows.
        let mut merge = table.merge_insert(&["article_id"]);
        merge
            .when_matched_update_all(None)
            .when_not_matched_insert_all();
        merge
            .execute(Box::new(reader))
            .await
            .map_err(|e| StoreError::Query(format!("Failed to upsert articles: {e}")))?;

        tracing::debug!(count = records.len(), table = %self.table_name, "stored articles");
        Ok(())
    }

    async fn get(&self, ids: &[String]) -> Result<Vec<ArticleRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let Some(table) = self.existing_table().await? else {
            return Ok(vec![]);
        };

        let filter = format!(
            "article_id IN ({})",
            ids.iter().map(|id| quote(id)).collect::<Vec<_>>().join(", ")
        );
        let results = table
            .query()
            .only_if(filter)
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to fetch articles: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to collect articles: {e}")))?;

        let mut by_id: HashMap<String, ArticleRecord> = HashMap::new();
        for batch in &batches {
            for record in batch_to_records(batch)? {
                by_id.entry(record.article_id.clone()).or_insert(record);
            }
        }

        // Requested order, unknown ids skipped.
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<Neighbor>, StoreError> {
        self.check_dimension(vector.len())?;
        let Some(table) = self.existing_table().await? else {
            return Ok(vec![]);
        };

        let results = table
            .vector_search(vector)
            .map_err(|e| StoreError::Query(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::L2)
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("Vector search failed: {e}")))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| StoreError::Query(format!("Failed to collect results: {e}")))?;

        let mut neighbors = Vec::new();
        for batch in &batches {
            if batch.num_rows() == 0 {
                continue;
            }

            // The _distance column is added by LanceDB vector search
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| StoreError::Query("search result has no _distance".to_string()))?;

            for (i, record) in batch_to_records(batch)?.into_iter().enumerate() {
                neighbors.push(Neighbor {
                    article_id: record.article_id.clone(),
                    metadata: record,
                    distance: distances.value(i),
                });
            }
        }

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(top_k);
        Ok(neighbors)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let Some(table) = self.existing_table().await? else {
            return Ok(0);
        };
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to count rows: {e}")))?;
        Ok(count as u64)
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.store
            .drop_table(&self.table_name)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to drop article table: {e}")))
    }
}

//! Application state wiring the embedder, store and services together.
//!
//! Services are generic over the embedder and store traits; AppState pins
//! them to the concrete infra implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use newsvec_core::article::index::IndexingService;
use newsvec_core::article::recommend::RecommendationService;
use newsvec_core::embedding::box_embedder::BoxEmbedder;
use newsvec_core::embedding::embedder::Embedder;
use newsvec_core::embedding::pipeline::EmbeddingPipeline;
use newsvec_infra::config::{load_config_file, load_global_config};
use newsvec_infra::embedder::build_embedder;
use newsvec_infra::filesystem::{resolve_data_dir, vector_store_dir};
use newsvec_infra::vector::article::LanceArticleStore;
use newsvec_types::config::GlobalConfig;
use newsvec_types::embedding::BatchProgress;

pub type ConcretePipeline = EmbeddingPipeline<BoxEmbedder>;

pub type ConcreteIndexingService = IndexingService<BoxEmbedder, LanceArticleStore>;

pub type ConcreteRecommendationService = RecommendationService<BoxEmbedder, LanceArticleStore>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub embedder: Arc<BoxEmbedder>,
    pub store: Arc<LanceArticleStore>,
    pub recommendation_service: Arc<ConcreteRecommendationService>,
}

impl AppState {
    /// Load configuration, construct the embedder and open the vector store.
    pub async fn init(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = match config_path {
            Some(path) => load_config_file(path).await,
            None => load_global_config(&data_dir).await,
        };

        let embedder = Arc::new(
            build_embedder(&config.embedder).context("Failed to set up the embedding backend")?,
        );

        let store_path = vector_store_dir(&data_dir, &config.store);
        let store = LanceArticleStore::open(store_path, config.store.table.clone(), embedder.dimension())
            .await
            .context("Failed to open the vector store")?;
        let store = Arc::new(store);

        let pipeline = EmbeddingPipeline::new(Arc::clone(&embedder), config.pipeline.clone())?;
        let recommendation_service =
            RecommendationService::new(Arc::new(pipeline), Arc::clone(&store));

        Ok(Self {
            config: Arc::new(config),
            data_dir,
            embedder,
            store,
            recommendation_service: Arc::new(recommendation_service),
        })
    }

    /// An indexing service whose pipeline reports progress to `progress`.
    pub fn indexing_service<F>(&self, progress: F) -> anyhow::Result<ConcreteIndexingService>
    where
        F: Fn(BatchProgress) + Send + Sync + 'static,
    {
        let pipeline: ConcretePipeline =
            EmbeddingPipeline::new(Arc::clone(&self.embedder), self.config.pipeline.clone())?
                .with_progress(progress);
        Ok(IndexingService::new(Arc::new(pipeline), Arc::clone(&self.store)))
    }
}

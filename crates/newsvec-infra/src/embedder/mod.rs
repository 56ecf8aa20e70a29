//! Embedding backends selected by `[embedder] provider`.

pub mod http;
pub mod local;

use newsvec_core::embedding::box_embedder::BoxEmbedder;
use newsvec_types::config::{EmbedderConfig, EmbedderProvider};
use newsvec_types::error::EmbedError;

use self::http::HttpEmbedder;
use self::local::FastEmbedEmbedder;

/// Construct the configured backend behind a [`BoxEmbedder`].
pub fn build_embedder(config: &EmbedderConfig) -> Result<BoxEmbedder, EmbedError> {
    match config.provider {
        EmbedderProvider::Http => {
            tracing::debug!(model = %config.model, base_url = %config.base_url, "using HTTP embedder");
            Ok(BoxEmbedder::new(HttpEmbedder::from_env(config)?))
        }
        EmbedderProvider::Fastembed => {
            tracing::debug!("using local fastembed embedder");
            Ok(BoxEmbedder::new(FastEmbedEmbedder::new()?))
        }
    }
}

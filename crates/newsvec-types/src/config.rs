//! Configuration types for newsvec.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! embedding pipeline, the embedding backend, and the vector store.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for newsvec.
///
/// Loaded from `~/.newsvec/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub embedder: EmbedderConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// Largest pool size a tokio semaphore can hold (`Semaphore::MAX_PERMITS`).
pub const MAX_CONCURRENCY: usize = usize::MAX >> 3;

/// Batching, pacing and concurrency settings for one embedding job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of texts sent in a single embedding call.
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,

    /// Upper bound on embedding calls started per second.
    #[serde(default = "default_calls_per_second")]
    pub calls_per_second: f64,

    /// Number of embedding calls allowed in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-call timeout. A call exceeding it fails its batch.
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,
}

fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN)
}

fn default_calls_per_second() -> f64 {
    10.0
}

/// `min(32, cpus + 4)`, the sizing rule of a typical blocking I/O pool.
fn default_max_concurrency() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (cpus + 4).min(32)
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            calls_per_second: default_calls_per_second(),
            max_concurrency: default_max_concurrency(),
            call_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.calls_per_second.is_finite()
            || self.calls_per_second <= 0.0
            || self.checked_interval().is_none()
        {
            return Err(ConfigError::InvalidRate(self.calls_per_second));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.max_concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::ConcurrencyTooLarge {
                max: MAX_CONCURRENCY,
                actual: self.max_concurrency,
            });
        }
        if self.call_timeout_secs == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Minimum spacing between the starts of two consecutive calls.
    ///
    /// Saturates at `Duration::MAX` for rates that `validate` rejects.
    pub fn submission_interval(&self) -> Duration {
        self.checked_interval().unwrap_or(Duration::MAX)
    }

    fn checked_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(1.0 / self.calls_per_second).ok()
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

/// Which embedding backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    /// OpenAI-compatible `/embeddings` HTTP endpoint.
    #[default]
    Http,
    /// Local BGE-small model through fastembed.
    Fastembed,
}

/// Embedding backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub provider: EmbedderProvider,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Output dimensionality of the HTTP model.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_key_env() -> String {
    "NEWSVEC_API_KEY".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderProvider::default(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            dimension: default_dimension(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store directory. Defaults to `{data_dir}/vector_store`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_table")]
    pub table: String,

    /// Number of neighbors returned per recommendation.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_table() -> String {
    "articles".to_string()
}

fn default_top_k() -> usize {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: default_table(),
            top_k: default_top_k(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_default_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size.get(), 5);
        assert_eq!(config.calls_per_second, 10.0);
        assert!(config.max_concurrency >= 5 && config.max_concurrency <= 32);
        assert_eq!(config.call_timeout_secs, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_submission_interval_is_inverse_rate() {
        let config = PipelineConfig {
            calls_per_second: 4.0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.submission_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                calls_per_second: rate,
                ..PipelineConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidRate(_))),
                "rate {rate} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_rate_whose_interval_overflows() {
        let config = PipelineConfig {
            calls_per_second: 1e-20,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidRate(1e-20)));
        assert_eq!(config.submission_interval(), Duration::MAX);
    }

    #[test]
    fn test_validate_rejects_pool_larger_than_semaphore_limit() {
        let config = PipelineConfig {
            max_concurrency: MAX_CONCURRENCY + 1,
            ..PipelineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConcurrencyTooLarge {
                max: MAX_CONCURRENCY,
                actual: MAX_CONCURRENCY + 1
            })
        );

        let config = PipelineConfig {
            max_concurrency: MAX_CONCURRENCY,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency_and_timeout() {
        let config = PipelineConfig {
            max_concurrency: 0,
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroConcurrency));

        let config = PipelineConfig {
            call_timeout_secs: Some(0),
            ..PipelineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.pipeline.batch_size.get(), 5);
        assert_eq!(config.embedder.provider, EmbedderProvider::Http);
        assert_eq!(config.store.table, "articles");
        assert_eq!(config.store.top_k, 5);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
[pipeline]
batch_size = 16
calls_per_second = 2.5
max_concurrency = 4
call_timeout_secs = 30

[embedder]
provider = "fastembed"

[store]
path = "/tmp/vectors"
top_k = 10
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pipeline.batch_size.get(), 16);
        assert_eq!(config.pipeline.calls_per_second, 2.5);
        assert_eq!(config.pipeline.max_concurrency, 4);
        assert_eq!(config.pipeline.call_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.embedder.provider, EmbedderProvider::Fastembed);
        assert_eq!(config.embedder.model, "text-embedding-3-small");
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/vectors")));
        assert_eq!(config.store.top_k, 10);
    }

    #[test]
    fn test_zero_batch_size_is_rejected_at_parse_time() {
        let result: Result<GlobalConfig, _> = toml::from_str("[pipeline]\nbatch_size = 0\n");
        assert!(result.is_err());
    }
}

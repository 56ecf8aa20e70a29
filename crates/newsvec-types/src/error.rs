use thiserror::Error;

/// Errors raised by an embedding backend for a whole call.
///
/// A backend either embeds every text it was given or fails the call;
/// there is no per-text error.
#[derive(Debug, Clone, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("embedding service rate limited the request")]
    RateLimited,

    #[error("authentication with the embedding service failed")]
    AuthenticationFailed,

    #[error("environment variable {0} holding the embedding API key is not set")]
    MissingApiKey(String),

    #[error("failed to decode embedding response: {0}")]
    Deserialization(String),

    #[error("embedding model error: {0}")]
    Model(String),
}

/// Errors that abort an embedding job as a whole.
///
/// Per-batch failures never surface here; they are recorded in the job
/// output's success flags.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "embedding dimension mismatch at input position {position}: expected {expected}, got {actual}"
    )]
    DimensionMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("calls_per_second must be a positive finite number, got {0}")]
    InvalidRate(f64),

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("max_concurrency must be at most {max}, got {actual}")]
    ConcurrencyTooLarge { max: usize, actual: usize },

    #[error("call_timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("top_k must be at least 1")]
    ZeroTopK,
}

/// Errors from vector store operations (used by trait definitions in newsvec-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("vector store connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("rows and metadata are misaligned: {records} records for {rows} vectors")]
    Misaligned { records: usize, rows: usize },

    #[error("vector has dimension {actual}, store expects {expected}")]
    Dimension { expected: usize, actual: usize },
}

/// Errors surfaced to callers of the recommendation flow.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("article '{0}' not found")]
    NotFound(String),

    #[error("article '{id}' is missing its {field}")]
    MalformedRecord { id: String, field: &'static str },

    #[error("query text could not be embedded")]
    EmbeddingFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ConfigError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from loading an article dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(String),

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
}

//! Batched, rate-limited, fault-tolerant text embedding.
//!
//! Input texts are split into fixed-size batches (`batcher`), each batch is
//! sent to the `Embedder` as an independent task under a submission-rate cap
//! and a concurrency cap (`dispatcher`), and the per-batch results are
//! reassembled in input order into success flags plus a dense matrix
//! (`aggregator`). `pipeline` ties the three together.

pub mod aggregator;
pub mod batcher;
pub mod box_embedder;
pub mod dispatcher;
pub mod embedder;
pub mod pipeline;

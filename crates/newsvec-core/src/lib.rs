//! Business logic and port traits for newsvec.
//!
//! This crate defines the embedding pipeline (batching, rate-limited
//! dispatch, aggregation) and the "ports" that the infrastructure layer
//! implements: the `Embedder` backend and the `ArticleStore` vector store.
//! It depends only on `newsvec-types` -- never on `newsvec-infra` or any
//! network/database crate.

pub mod article;
pub mod embedding;

#[cfg(test)]
pub(crate) mod testing;

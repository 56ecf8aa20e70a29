//! Vector database infrastructure for article embeddings.
//!
//! Provides LanceDB connection management and the `ArticleStore`
//! implementation. Arrow schemas define the table structure.

pub mod article;
pub mod lance;
pub mod schema;

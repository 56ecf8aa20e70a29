//! Article indexing and recommendation on top of the embedding pipeline.

pub mod index;
pub mod recommend;
pub mod store;
pub mod text;

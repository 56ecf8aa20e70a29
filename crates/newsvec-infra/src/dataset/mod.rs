//! Article dataset loaders.

pub mod nyt;

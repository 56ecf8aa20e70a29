//! Infrastructure layer for newsvec.
//!
//! Contains implementations of the ports defined in `newsvec-core`:
//! HTTP and local embedding backends, the LanceDB article store, plus
//! dataset loading and configuration.

pub mod config;
pub mod dataset;
pub mod embedder;
pub mod filesystem;
pub mod vector;

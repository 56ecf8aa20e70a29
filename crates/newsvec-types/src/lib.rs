//! Shared domain types for newsvec.
//!
//! This crate contains the domain types used across the workspace: pipeline
//! configuration, embedding job output, article records, recommendations,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod article;
pub mod config;
pub mod embedding;
pub mod error;

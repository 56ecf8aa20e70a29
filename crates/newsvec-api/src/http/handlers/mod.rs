//! REST endpoint handlers.

pub mod article;
pub mod health;
pub mod recommend;

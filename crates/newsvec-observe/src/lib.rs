//! Observability setup shared by the newsvec binaries.

pub mod tracing_setup;

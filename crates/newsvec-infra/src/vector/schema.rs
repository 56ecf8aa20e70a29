//! Arrow schema for the LanceDB article table.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// Metadata columns in storage order, followed by `vector`.
pub const METADATA_COLUMNS: [&str; 5] = ["article_id", "uri", "headline", "abstract", "lead_paragraph"];

/// Schema for an article table whose vectors have `dimension` components.
pub fn article_schema(dimension: i32) -> Schema {
    let mut fields: Vec<Field> = METADATA_COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, false))
        .collect();
    fields.push(Field::new("vector", vector_type(dimension), false));
    Schema::new(fields)
}

/// `FixedSizeList<Float32>` of length `dimension`.
pub fn vector_type(dimension: i32) -> DataType {
    DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dimension,
    )
}

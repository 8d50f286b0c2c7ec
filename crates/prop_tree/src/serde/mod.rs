//! Serde adapters for polars types stored on fitted estimators.

pub mod schema;

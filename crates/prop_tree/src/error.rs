//! Error types for tree building and propositionalization

use estimator_api::api::{FitError, PredictError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PropTreeError>;

#[derive(Error, Debug)]
pub enum PropTreeError {
    #[error("Unknown {kind} strategy: '{value}'")]
    UnknownStrategy { kind: &'static str, value: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Bag {bag} has instances of dimension {actual}, expected {expected}")]
    Dimension {
        expected: usize,
        actual: usize,
        bag: usize,
    },

    #[error("Training dataset contains no labelled bags")]
    EmptyDataset,

    #[error("Model not fitted")]
    NotFitted,

    #[error("Wrapped model failed to fit: {0}")]
    Fit(#[from] FitError),

    #[error("Wrapped model failed to predict: {0}")]
    Predict(#[from] PredictError),

    #[error("Data error: {0}")]
    Data(String),
}

impl From<polars::error::PolarsError> for PropTreeError {
    fn from(err: polars::error::PolarsError) -> Self {
        PropTreeError::Data(err.to_string())
    }
}

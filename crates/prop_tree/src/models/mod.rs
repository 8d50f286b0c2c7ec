//! Classifiers that can be wrapped by the tree.
//!
//! - [`LogisticRegression`] - L2-regularised logistic regression on standardised features
//! - [`GaussianNaiveBayes`] - per-class Gaussian likelihoods

mod logistic;
mod naive_bayes;

pub use logistic::LogisticRegression;
pub use naive_bayes::GaussianNaiveBayes;

use ndarray::Array2;
use polars::prelude::*;

/// Copy every column of `x` into a row-major `f64` matrix. Nulls read as 0.
pub(crate) fn to_array(x: &DataFrame) -> PolarsResult<Array2<f64>> {
    let (n_rows, n_cols) = (x.height(), x.width());
    let mut out = Array2::<f64>::zeros((n_rows, n_cols));
    for (j, column) in x.get_columns().iter().enumerate() {
        let casted = column.cast(&DataType::Float64)?;
        for (i, value) in casted.f64()?.into_iter().enumerate() {
            out[[i, j]] = value.unwrap_or(0.0);
        }
    }
    Ok(out)
}

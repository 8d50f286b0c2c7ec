use crate::folds::stratified_folds;
use polars::prelude::*;
use rand::rngs::StdRng;
use thiserror::Error;

/// Probability vector of a binary classifier, indexed by class label.
pub type ClassProbabilities = [f64; 2];

#[derive(Debug, Error)]
pub enum FitError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Numerical error: {0}")]
    Numerical(String),
    #[error("Data error: {0}")]
    Data(#[from] PolarsError),
    #[error("Prediction failed during cross-validation: {0}")]
    Predict(#[from] PredictError),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Model is not fitted")]
    NotFitted,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Numerical error: {0}")]
    Numerical(String),
    #[error("Data error: {0}")]
    Data(#[from] PolarsError),
}

/// Held-out predictions of one cross-validation fold.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldPredictions {
    pub fold: usize,
    /// Row indices (into the table handed to `cross_validate`) of the held-out rows.
    pub test_indices: Vec<usize>,
    /// Labels of the rows the fold was trained on, in table order.
    pub train_labels: Vec<u32>,
    /// One probability vector per entry of `test_indices`.
    pub probabilities: Vec<ClassProbabilities>,
}

/// A trainable binary classifier over a numeric feature table.
///
/// Implementors must be cheap to clone in their unfitted state: cross-validation
/// and split evaluation train a fresh clone for every fit.
pub trait Estimator: Clone {
    fn fit(&mut self, x: &DataFrame, y: &[u32]) -> Result<(), FitError>;

    fn predict_proba(&self, x: &DataFrame) -> Result<Vec<ClassProbabilities>, PredictError>;

    /// Stratified k-fold cross-validation. The fold assignment draws from `rng`,
    /// so repeated calls with an identically seeded generator are identical.
    fn cross_validate(
        &self,
        x: &DataFrame,
        y: &[u32],
        folds: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<FoldPredictions>, FitError> {
        if x.height() != y.len() {
            return Err(FitError::InvalidInput(format!(
                "feature table has {} rows but {} labels were given",
                x.height(),
                y.len()
            )));
        }
        if y.len() < 2 {
            return Err(FitError::InvalidInput(format!(
                "cross-validation needs at least 2 rows, got {}",
                y.len()
            )));
        }

        let assignment = stratified_folds(y, folds.min(y.len()), rng);
        let mut out = Vec::with_capacity(assignment.len());
        for (fold, test_indices) in assignment.iter().enumerate() {
            let train_indices: Vec<usize> = assignment
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != fold)
                .flat_map(|(_, rows)| rows.iter().copied())
                .collect();

            let train_x = x.take(&to_idx(&train_indices))?;
            let train_y: Vec<u32> = train_indices.iter().map(|&i| y[i]).collect();
            let test_x = x.take(&to_idx(test_indices))?;

            let mut model = self.clone();
            model.fit(&train_x, &train_y)?;
            let probabilities = model.predict_proba(&test_x)?;

            out.push(FoldPredictions {
                fold,
                test_indices: test_indices.clone(),
                train_labels: train_y,
                probabilities,
            });
        }
        Ok(out)
    }
}

fn to_idx(rows: &[usize]) -> UInt32Chunked {
    let rows: Vec<u32> = rows.iter().map(|&r| r as u32).collect();
    UInt32Chunked::from_slice(PlSmallStr::from_static("idx"), &rows)
}

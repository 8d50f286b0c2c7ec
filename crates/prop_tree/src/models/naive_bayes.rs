use super::to_array;
use estimator_api::api::{ClassProbabilities, Estimator, FitError, PredictError};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Gaussian Naive Bayes over the two class labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNaiveBayes {
    /// Added to every variance so constant features stay finite
    pub var_smoothing: f64,
    means: [Vec<f64>; 2],
    variances: [Vec<f64>; 2],
    priors: [f64; 2],
    fitted: bool,
}

impl Default for GaussianNaiveBayes {
    fn default() -> Self {
        Self::new()
    }
}

impl GaussianNaiveBayes {
    pub fn new() -> Self {
        Self {
            var_smoothing: 1e-9,
            means: [Vec::new(), Vec::new()],
            variances: [Vec::new(), Vec::new()],
            priors: [0.0, 0.0],
            fitted: false,
        }
    }

    pub fn with_var_smoothing(mut self, smoothing: f64) -> Self {
        self.var_smoothing = smoothing;
        self
    }

    fn log_likelihood(&self, row: ArrayView1<f64>, class: usize) -> f64 {
        row.iter()
            .zip(self.means[class].iter().zip(self.variances[class].iter()))
            .map(|(&x, (&mean, &var))| -0.5 * (2.0 * PI * var).ln() - (x - mean).powi(2) / (2.0 * var))
            .sum()
    }

    fn row_proba(&self, x: &Array2<f64>, i: usize) -> ClassProbabilities {
        let row = x.row(i);
        let mut log_post = [f64::NEG_INFINITY; 2];
        for class in 0..2 {
            if self.priors[class] > 0.0 {
                log_post[class] = self.priors[class].ln() + self.log_likelihood(row, class);
            }
        }
        let max = log_post[0].max(log_post[1]);
        let unnorm = [(log_post[0] - max).exp(), (log_post[1] - max).exp()];
        let total = unnorm[0] + unnorm[1];
        [unnorm[0] / total, unnorm[1] / total]
    }
}

impl Estimator for GaussianNaiveBayes {
    fn fit(&mut self, x: &DataFrame, y: &[u32]) -> Result<(), FitError> {
        let x = to_array(x)?;
        let (n_samples, n_features) = x.dim();
        if n_samples != y.len() {
            return Err(FitError::InvalidInput(format!(
                "feature table has {} rows but {} labels were given",
                n_samples,
                y.len()
            )));
        }
        if n_samples == 0 {
            return Err(FitError::InvalidInput("no training rows".to_string()));
        }

        for class in 0..2 {
            // Welford
            let mut means = vec![0.0; n_features];
            let mut m2 = vec![0.0; n_features];
            let mut count = 0usize;
            for (i, _) in y.iter().enumerate().filter(|(_, l)| **l as usize == class) {
                count += 1;
                for (j, &val) in x.row(i).iter().enumerate() {
                    let delta = val - means[j];
                    means[j] += delta / count as f64;
                    m2[j] += delta * (val - means[j]);
                }
            }
            self.priors[class] = count as f64 / n_samples as f64;
            let denom = count.max(1) as f64;
            self.variances[class] = m2.iter().map(|&m| m / denom + self.var_smoothing).collect();
            self.means[class] = means;
        }
        self.fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &DataFrame) -> Result<Vec<ClassProbabilities>, PredictError> {
        if !self.fitted {
            return Err(PredictError::NotFitted);
        }
        let x = to_array(x)?;
        if x.ncols() != self.means[0].len() {
            return Err(PredictError::InvalidInput(format!(
                "expected {} features, got {}",
                self.means[0].len(),
                x.ncols()
            )));
        }
        Ok((0..x.nrows()).map(|i| self.row_proba(&x, i)).collect())
    }
}

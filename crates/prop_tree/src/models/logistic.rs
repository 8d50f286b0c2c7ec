use super::to_array;
use estimator_api::api::{ClassProbabilities, Estimator, FitError, PredictError};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Binary logistic regression fitted by batch gradient descent.
///
/// Features are standardised with the training mean and standard deviation
/// before fitting, which keeps the descent stable when counts and sums of very
/// different magnitudes sit side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// L2 regularisation strength
    pub alpha: f64,
    pub max_iter: usize,
    /// Stop once the gradient norm falls below this value
    pub tol: f64,
    pub learning_rate: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            coefficients: None,
            intercept: 0.0,
            means: Array1::zeros(0),
            scales: Array1::zeros(0),
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    fn standardise(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.means) / &self.scales
    }
}

impl Estimator for LogisticRegression {
    fn fit(&mut self, x: &DataFrame, y: &[u32]) -> Result<(), FitError> {
        let x = to_array(x)?;
        let n_samples = x.nrows();
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

        self.means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
        self.scales = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 0.0 { s } else { 1.0 });
        let x = self.standardise(&x);
        let y: Array1<f64> = y.iter().map(|&label| label as f64).collect();

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        for _ in 0..self.max_iter {
            let predictions = Self::sigmoid(&(x.dot(&weights) + bias));
            let errors = &predictions - &y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (self.alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if !grad_norm.is_finite() {
                return Err(FitError::Numerical(
                    "gradient diverged during logistic regression fit".to_string(),
                ));
            }
            if grad_norm < self.tol {
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        self.coefficients = Some(weights);
        self.intercept = bias;
        Ok(())
    }

    fn predict_proba(&self, x: &DataFrame) -> Result<Vec<ClassProbabilities>, PredictError> {
        let coefficients = self.coefficients.as_ref().ok_or(PredictError::NotFitted)?;
        let x = to_array(x)?;
        if x.ncols() != coefficients.len() {
            return Err(PredictError::InvalidInput(format!(
                "expected {} features, got {}",
                coefficients.len(),
                x.ncols()
            )));
        }
        let p = Self::sigmoid(&(self.standardise(&x).dot(coefficients) + self.intercept));
        Ok(p.iter().map(|&p1| [1.0 - p1, p1]).collect())
    }
}

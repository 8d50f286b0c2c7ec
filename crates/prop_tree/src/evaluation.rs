use crate::conf::CV_FOLDS;
use crate::error::{PropTreeError, Result};
use estimator_api::api::{ClassProbabilities, Estimator};
use polars::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_PROBABILITY: f64 = 1e-12;

/// Scores a propositionalized table by training the wrapped model on it.
/// Every variant returns an error to minimise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationStrategy {
    /// Misclassified rows, fitting and scoring on the same table.
    Misclass,
    /// Misclassified held-out rows over a stratified 5-fold cross-validation.
    #[default]
    CvMisclass,
    /// Root mean squared error of the class probability vectors.
    Rmse,
    CvRmse,
    /// Negated mean information gain (bits) of the model over the label prior.
    InfoGain,
    CvInfoGain,
}

impl EvaluationStrategy {
    pub const ALL: [EvaluationStrategy; 6] = [
        EvaluationStrategy::Misclass,
        EvaluationStrategy::CvMisclass,
        EvaluationStrategy::Rmse,
        EvaluationStrategy::CvRmse,
        EvaluationStrategy::InfoGain,
        EvaluationStrategy::CvInfoGain,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EvaluationStrategy::Misclass => "misclass",
            EvaluationStrategy::CvMisclass => "cv-misclass",
            EvaluationStrategy::Rmse => "rmse",
            EvaluationStrategy::CvRmse => "cv-rmse",
            EvaluationStrategy::InfoGain => "info-gain",
            EvaluationStrategy::CvInfoGain => "cv-info-gain",
        }
    }

    pub fn is_cross_validated(&self) -> bool {
        matches!(
            self,
            EvaluationStrategy::CvMisclass | EvaluationStrategy::CvRmse | EvaluationStrategy::CvInfoGain
        )
    }

    /// Train a fresh clone of `prototype` on `(x, y)` and return the error.
    ///
    /// Cross-validated variants draw their fold assignment from `rng`; tables
    /// with fewer than two rows are scored without cross-validation.
    pub fn evaluate<M: Estimator>(
        &self,
        x: &DataFrame,
        y: &[u32],
        prototype: &M,
        rng: &mut StdRng,
    ) -> Result<f64> {
        let mut score = Score::default();
        if self.is_cross_validated() && y.len() >= 2 {
            for fold in prototype.cross_validate(x, y, CV_FOLDS, rng)? {
                let prior = LabelPrior::from_labels(&fold.train_labels);
                for (&row, p) in fold.test_indices.iter().zip(fold.probabilities.iter()) {
                    score.add(p, y[row], &prior);
                }
            }
        } else {
            let mut model = prototype.clone();
            model.fit(x, y)?;
            let prior = LabelPrior::from_labels(y);
            for (p, &label) in model.predict_proba(x)?.iter().zip(y.iter()) {
                score.add(p, label, &prior);
            }
        }

        Ok(match self {
            EvaluationStrategy::Misclass | EvaluationStrategy::CvMisclass => score.misclassified,
            EvaluationStrategy::Rmse | EvaluationStrategy::CvRmse => score.rmse(),
            EvaluationStrategy::InfoGain | EvaluationStrategy::CvInfoGain => -score.mean_info_gain(),
        })
    }
}

/// Laplace-smoothed class distribution of a set of training labels.
struct LabelPrior([f64; 2]);

impl LabelPrior {
    fn from_labels(labels: &[u32]) -> Self {
        let positives = labels.iter().filter(|&&l| l == 1).count() as f64;
        let total = labels.len() as f64 + 2.0;
        LabelPrior([(labels.len() as f64 - positives + 1.0) / total, (positives + 1.0) / total])
    }
}

#[derive(Debug, Default)]
struct Score {
    rows: usize,
    misclassified: f64,
    squared_error: f64,
    info_gain_bits: f64,
}

impl Score {
    fn add(&mut self, p: &ClassProbabilities, label: u32, prior: &LabelPrior) {
        let label = label.min(1) as usize;
        let predicted = if p[1] > p[0] { 1 } else { 0 };
        self.rows += 1;
        if predicted != label {
            self.misclassified += 1.0;
        }
        self.squared_error += (0..2)
            .map(|c| (p[c] - if c == label { 1.0 } else { 0.0 }).powi(2))
            .sum::<f64>();
        let p_model = p[label].clamp(MIN_PROBABILITY, 1.0);
        self.info_gain_bits += p_model.log2() - prior.0[label].log2();
    }

    fn rmse(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        (self.squared_error / (self.rows as f64 * 2.0)).sqrt()
    }

    fn mean_info_gain(&self) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        self.info_gain_bits / self.rows as f64
    }
}

impl fmt::Display for EvaluationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EvaluationStrategy {
    type Err = PropTreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EvaluationStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| PropTreeError::UnknownStrategy {
                kind: "evaluation",
                value: s.to_string(),
            })
    }
}

use crate::bag::{ActiveMask, Dataset};
use crate::error::PropTreeError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A candidate `attribute <= threshold` test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitCandidate {
    pub attribute: usize,
    pub threshold: f64,
}

impl SplitCandidate {
    pub fn new(attribute: usize, threshold: f64) -> Self {
        Self {
            attribute,
            threshold,
        }
    }
}

impl fmt::Display for SplitCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{} <= {:.6}", self.attribute, self.threshold)
    }
}

/// How candidate thresholds are proposed from the instances active at a node.
///
/// Attributes with no active values produce no candidate under any strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// Arithmetic mean of the active values.
    Mean,
    /// Median of the active values; even counts average the two middle values.
    #[default]
    Median,
    /// Midpoint between every adjacent pair of sorted values whose bag labels differ.
    Discretized,
    /// `(max + min) / 2` of the active values.
    RangeMidpoint,
}

impl SplitStrategy {
    pub const ALL: [SplitStrategy; 4] = [
        SplitStrategy::Mean,
        SplitStrategy::Median,
        SplitStrategy::Discretized,
        SplitStrategy::RangeMidpoint,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SplitStrategy::Mean => "mean",
            SplitStrategy::Median => "median",
            SplitStrategy::Discretized => "discretized",
            SplitStrategy::RangeMidpoint => "range-midpoint",
        }
    }

    /// Candidates ordered by ascending attribute, then ascending threshold.
    pub fn generate_candidates(&self, dataset: &Dataset, mask: &ActiveMask) -> Vec<SplitCandidate> {
        let mut candidates: Vec<SplitCandidate> = Vec::new();
        for attribute in 0..dataset.n_attributes() {
            let values: Vec<(f64, Option<u32>)> = dataset
                .active(mask)
                .map(|(inst, label)| (inst[attribute], label))
                .collect();
            if values.is_empty() {
                continue;
            }

            match self {
                SplitStrategy::Mean => {
                    let sum: f64 = values.iter().map(|(v, _)| v).sum();
                    candidates.push(SplitCandidate::new(attribute, sum / values.len() as f64));
                }
                SplitStrategy::Median => {
                    let data = Data::new(values.iter().map(|(v, _)| *v).collect::<Vec<f64>>());
                    candidates.push(SplitCandidate::new(attribute, data.median()));
                }
                SplitStrategy::RangeMidpoint => {
                    let (min, max) = values.iter().fold(
                        (f64::INFINITY, f64::NEG_INFINITY),
                        |(lo, hi), (v, _)| (lo.min(*v), hi.max(*v)),
                    );
                    candidates.push(SplitCandidate::new(attribute, (max + min) / 2.0));
                }
                SplitStrategy::Discretized => {
                    candidates.extend(
                        class_boundaries(values)
                            .into_iter()
                            .map(|t| SplitCandidate::new(attribute, t)),
                    );
                }
            }
        }
        candidates
    }

    /// Whether a node whose active instances are given by `mask` may be split.
    ///
    /// Every strategy requires at least one active instance; the discretized
    /// strategy additionally requires both bag labels to be present.
    pub fn can_expand(&self, dataset: &Dataset, mask: &ActiveMask) -> bool {
        match self {
            SplitStrategy::Discretized => {
                let mut seen = [false, false];
                for (_, label) in dataset.active(mask) {
                    if let Some(l) = label {
                        seen[l.min(1) as usize] = true;
                    }
                    if seen[0] && seen[1] {
                        return true;
                    }
                }
                false
            }
            _ => mask.active_count() > 0,
        }
    }
}

/// Sorted, de-duplicated midpoints between adjacent values whose labels differ.
fn class_boundaries(mut values: Vec<(f64, Option<u32>)>) -> Vec<f64> {
    values.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    values
        .iter()
        .tuple_windows()
        .filter(|(lo, hi)| lo.1 != hi.1)
        .map(|(lo, hi)| (lo.0 + hi.0) / 2.0)
        .dedup()
        .collect()
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SplitStrategy {
    type Err = PropTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplitStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| PropTreeError::UnknownStrategy {
                kind: "split",
                value: s.to_string(),
            })
    }
}

use crate::bag::{ActiveMask, Instance};
use crate::error::PropTreeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SUMMARY_STATS: [&str; 5] = ["count", "sum", "min", "max", "mean"];

/// Summary computed for the instances of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropositionalisationStrategy {
    /// A single feature: the number of active instances.
    CountOnly,
    /// Count, sum, min, max and mean of every raw attribute.
    #[default]
    SummaryStats,
}

impl PropositionalisationStrategy {
    pub const ALL: [PropositionalisationStrategy; 2] = [
        PropositionalisationStrategy::CountOnly,
        PropositionalisationStrategy::SummaryStats,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PropositionalisationStrategy::CountOnly => "count-only",
            PropositionalisationStrategy::SummaryStats => "summary-stats",
        }
    }

    /// Width of the slice one region occupies in the output vector.
    pub fn features_per_region(&self, n_attributes: usize) -> usize {
        match self {
            PropositionalisationStrategy::CountOnly => 1,
            PropositionalisationStrategy::SummaryStats => SUMMARY_STATS.len() * n_attributes,
        }
    }

    /// Column names for `num_regions` consecutive regions, region 0 first.
    pub fn attribute_names_for(&self, num_regions: usize, n_attributes: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(num_regions * self.features_per_region(n_attributes));
        for region in 0..num_regions {
            match self {
                PropositionalisationStrategy::CountOnly => {
                    names.push(format!("region_{region}_count"));
                }
                PropositionalisationStrategy::SummaryStats => {
                    for attribute in 0..n_attributes {
                        for stat in SUMMARY_STATS {
                            names.push(format!("region_{region}_a{attribute}_{stat}"));
                        }
                    }
                }
            }
        }
        names
    }

    /// Write the features of the instances still active under `ignore` into
    /// `out[offset..offset + features_per_region(n_attributes)]`.
    ///
    /// Empty regions produce zeros everywhere, never NaN or infinities.
    pub fn propositionalize(
        &self,
        instances: &[Instance],
        n_attributes: usize,
        ignore: &ActiveMask,
        out: &mut [f64],
        offset: usize,
    ) {
        let active = || {
            instances
                .iter()
                .enumerate()
                .filter(|(i, _)| ignore.is_active(*i))
                .map(|(_, inst)| inst)
        };

        match self {
            PropositionalisationStrategy::CountOnly => {
                out[offset] = active().count() as f64;
            }
            PropositionalisationStrategy::SummaryStats => {
                let width = SUMMARY_STATS.len();
                for attribute in 0..n_attributes {
                    let mut count = 0usize;
                    let mut sum = 0.0;
                    let mut min = f64::INFINITY;
                    let mut max = f64::NEG_INFINITY;
                    for inst in active() {
                        let v = inst[attribute];
                        count += 1;
                        sum += v;
                        min = min.min(v);
                        max = max.max(v);
                    }

                    let slot = &mut out[offset + attribute * width..offset + (attribute + 1) * width];
                    slot[0] = count as f64;
                    slot[1] = sum;
                    if count == 0 {
                        slot[2] = 0.0;
                        slot[3] = 0.0;
                        slot[4] = 0.0;
                    } else {
                        slot[2] = min;
                        slot[3] = max;
                        slot[4] = sum / count as f64;
                    }
                }
            }
        }
    }
}

impl fmt::Display for PropositionalisationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PropositionalisationStrategy {
    type Err = PropTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropositionalisationStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| PropTreeError::UnknownStrategy {
                kind: "propositionalization",
                value: s.to_string(),
            })
    }
}

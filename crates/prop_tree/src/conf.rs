use crate::error::{PropTreeError, Result};
use crate::evaluation::EvaluationStrategy;
use crate::propositionalisation::PropositionalisationStrategy;
use crate::search::SearchStrategy;
use crate::split::SplitStrategy;
use serde::{Deserialize, Serialize};

/// Name of the label column appended to every propositionalized table.
pub const CLASS_COLUMN: &str = "class";
/// Folds used by the cross-validated evaluation strategies.
pub const CV_FOLDS: usize = 5;
pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TreeConfig {
    pub split_strategy: SplitStrategy,
    pub search_strategy: SearchStrategy,
    pub propositionalisation: PropositionalisationStrategy,
    pub evaluation: EvaluationStrategy,
    /// Committed split nodes allowed; zero or less builds the whole-bag-only tree.
    pub max_node_count: i64,
    /// Active instances a node needs before it may be split.
    pub min_occupancy: usize,
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            split_strategy: SplitStrategy::Median,
            search_strategy: SearchStrategy::BreadthFirst,
            propositionalisation: PropositionalisationStrategy::SummaryStats,
            evaluation: EvaluationStrategy::CvMisclass,
            max_node_count: 8,
            min_occupancy: 5,
            seed: DEFAULT_SEED,
        }
    }
}

impl TreeConfig {
    /// Node budget as a count; non-positive budgets become zero.
    pub fn node_budget(&self) -> usize {
        self.max_node_count.max(0) as usize
    }

    /// Start from the defaults and apply `(option, value)` pairs in order.
    ///
    /// Recognised options: `split-strategy`, `search-strategy`,
    /// `propositionalization-strategy`, `evaluation-strategy`,
    /// `max-node-count`, `min-occupancy`, `rng-seed`.
    pub fn from_options<'a, I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = TreeConfig::default();
        for (key, value) in options {
            match key {
                "split-strategy" => config.split_strategy = value.parse()?,
                "search-strategy" => config.search_strategy = value.parse()?,
                "propositionalization-strategy" => config.propositionalisation = value.parse()?,
                "evaluation-strategy" => config.evaluation = value.parse()?,
                "max-node-count" => config.max_node_count = parse_number(key, value)?,
                "min-occupancy" => {
                    let n: i64 = parse_number(key, value)?;
                    config.min_occupancy = usize::try_from(n).map_err(|_| invalid(key, value, "must be >= 0"))?;
                }
                "rng-seed" => config.seed = parse_number(key, value)?,
                _ => return Err(invalid(key, value, "unrecognised option")),
            }
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "not an integer"))
}

fn invalid(key: &str, value: &str, reason: &str) -> PropTreeError {
    PropTreeError::InvalidParameter {
        name: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

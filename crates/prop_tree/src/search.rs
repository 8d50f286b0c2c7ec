//! Tree growth: which node is expanded next, and with which split.

use crate::bag::{ActiveMask, Dataset};
use crate::conf::{CLASS_COLUMN, TreeConfig};
use crate::error::{PropTreeError, Result};
use crate::evaluation::EvaluationStrategy;
use crate::propositionalisation::PropositionalisationStrategy;
use crate::split::{SplitCandidate, SplitStrategy};
use crate::tree::{LeafReason, Tree};
use estimator_api::api::Estimator;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Expand committed nodes in FIFO order; slots follow visitation order.
    #[default]
    BreadthFirst,
    /// Each round, commit the frontier node whose best split has the lowest error.
    BestFirst,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 2] = [SearchStrategy::BreadthFirst, SearchStrategy::BestFirst];

    pub fn id(&self) -> &'static str {
        match self {
            SearchStrategy::BreadthFirst => "breadth-first",
            SearchStrategy::BestFirst => "best-first",
        }
    }

    pub fn build<M: Estimator>(&self, params: &TreeBuildingParams<'_, M>, rng: &mut StdRng) -> Result<Tree> {
        match self {
            SearchStrategy::BreadthFirst => breadth_first(params, rng),
            SearchStrategy::BestFirst => best_first(params, rng),
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SearchStrategy {
    type Err = PropTreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SearchStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| PropTreeError::UnknownStrategy {
                kind: "search",
                value: s.to_string(),
            })
    }
}

/// Everything a search needs, fixed for the duration of one build.
#[derive(Debug, Clone)]
pub struct TreeBuildingParams<'a, M: Estimator> {
    pub dataset: &'a Dataset,
    pub n_instances: usize,
    pub max_node_count: usize,
    pub min_occupancy: usize,
    pub split_strategy: SplitStrategy,
    pub propositionalisation: PropositionalisationStrategy,
    pub evaluation: EvaluationStrategy,
    pub model: &'a M,
}

impl<'a, M: Estimator> TreeBuildingParams<'a, M> {
    pub fn new(dataset: &'a Dataset, config: &TreeConfig, model: &'a M) -> Self {
        Self {
            dataset,
            n_instances: dataset.n_instances(),
            max_node_count: config.node_budget(),
            min_occupancy: config.min_occupancy,
            split_strategy: config.split_strategy,
            propositionalisation: config.propositionalisation,
            evaluation: config.evaluation,
            model,
        }
    }

    /// `None` when a node with these active instances may be split, otherwise
    /// the reason it stays a leaf.
    fn leaf_reason(&self, mask: &ActiveMask) -> Option<LeafReason> {
        let occupancy = mask.active_count();
        if occupancy < self.min_occupancy.max(1) {
            Some(LeafReason::BelowMinOccupancy(occupancy))
        } else if !self.split_strategy.can_expand(self.dataset, mask) {
            Some(LeafReason::NotExpandable)
        } else {
            None
        }
    }
}

/// Grow a partition tree on `dataset` as configured, scoring splits with
/// clones of `prototype`. `rng` drives every cross-validation fold assignment.
pub fn build_tree<M: Estimator>(
    dataset: &Dataset,
    config: &TreeConfig,
    prototype: &M,
    rng: &mut StdRng,
) -> Result<Tree> {
    if dataset.is_empty() {
        return Err(PropTreeError::EmptyDataset);
    }
    let params = TreeBuildingParams::new(dataset, config, prototype);
    info!(
        search = %config.search_strategy,
        split = %config.split_strategy,
        propositionalisation = %config.propositionalisation,
        evaluation = %config.evaluation,
        bags = dataset.n_bags(),
        instances = params.n_instances,
        max_node_count = config.max_node_count,
        "building tree"
    );
    let tree = config.search_strategy.build(&params, rng)?;
    info!(
        nodes = tree.node_count(),
        root_error = ?tree.root().error,
        "tree built"
    );
    Ok(tree)
}

/// Score every candidate split of `index` by propositionalizing the whole
/// dataset with that split in place. Returns the lowest-error candidate, the
/// first one on ties, and leaves the node uncommitted.
fn select_best_split<M: Estimator>(
    tree: &mut Tree,
    index: usize,
    mask: &ActiveMask,
    params: &TreeBuildingParams<'_, M>,
    rng: &mut StdRng,
) -> Result<Option<(SplitCandidate, f64)>> {
    let candidates = params.split_strategy.generate_candidates(params.dataset, mask);
    let mut best: Option<(SplitCandidate, f64)> = None;
    for candidate in candidates {
        tree.set_tentative(index, candidate);
        let outcome = evaluate_layout(tree, params, rng);
        tree.clear_tentative();
        let mut error = outcome?;
        if error.is_nan() {
            error = f64::INFINITY;
        }
        trace!(node = index, %candidate, error, "evaluated candidate");
        if best.is_none_or(|(_, lowest)| error < lowest) {
            best = Some((candidate, error));
        }
    }
    Ok(best)
}

fn evaluate_layout<M: Estimator>(
    tree: &Tree,
    params: &TreeBuildingParams<'_, M>,
    rng: &mut StdRng,
) -> Result<f64> {
    let (table, labels, _) = tree.propositionalize_dataset(params.dataset)?;
    let features = table.drop(CLASS_COLUMN)?;
    params.evaluation.evaluate(&features, &labels, params.model, rng)
}

/// Shared start of both searches: commit the root's best split, or return
/// `None` when the tree must stay a single whole-bag region.
fn init_root<M: Estimator>(
    tree: &mut Tree,
    params: &TreeBuildingParams<'_, M>,
    rng: &mut StdRng,
) -> Result<Option<ActiveMask>> {
    let mask = ActiveMask::all_active(params.n_instances);
    if params.max_node_count == 0 {
        tree.mark_leaf(0, LeafReason::BudgetExhausted);
        return Ok(None);
    }
    if let Some(reason) = params.leaf_reason(&mask) {
        debug!(?reason, "root is not expandable");
        tree.mark_leaf(0, reason);
        return Ok(None);
    }
    match select_best_split(tree, 0, &mask, params, rng)? {
        Some((candidate, error)) => {
            tree.commit(0, candidate, error);
            Ok(Some(mask))
        }
        None => {
            tree.mark_leaf(0, LeafReason::NoCandidates);
            Ok(None)
        }
    }
}

fn breadth_first<M: Estimator>(params: &TreeBuildingParams<'_, M>, rng: &mut StdRng) -> Result<Tree> {
    let mut tree = Tree::new(params.dataset.n_attributes(), params.propositionalisation);
    let Some(root_mask) = init_root(&mut tree, params, rng)? else {
        return Ok(tree);
    };

    let mut queue: VecDeque<(usize, ActiveMask)> = VecDeque::from([(0, root_mask)]);
    while tree.node_count() < params.max_node_count {
        let Some((index, mask)) = queue.pop_front() else {
            break;
        };
        let Some(split) = tree.nodes()[index].split else {
            continue;
        };
        let (left_mask, right_mask) = mask.split_pool(params.dataset, split.attribute, split.threshold);
        let (left, right) = tree.expand(index);

        for (child, child_mask) in [(left, left_mask), (right, right_mask)] {
            if tree.node_count() >= params.max_node_count {
                tree.mark_leaf(child, LeafReason::BudgetExhausted);
                continue;
            }
            if let Some(reason) = params.leaf_reason(&child_mask) {
                tree.mark_leaf(child, reason);
                continue;
            }
            match select_best_split(&mut tree, child, &child_mask, params, rng)? {
                Some((candidate, error)) => {
                    tree.commit(child, candidate, error);
                    queue.push_back((child, child_mask));
                }
                None => tree.mark_leaf(child, LeafReason::NoCandidates),
            }
        }
    }
    Ok(tree)
}

/// Expand a freshly committed node and queue its expandable children.
fn push_children<M: Estimator>(
    tree: &mut Tree,
    index: usize,
    mask: &ActiveMask,
    params: &TreeBuildingParams<'_, M>,
    frontier: &mut Vec<(usize, ActiveMask)>,
) {
    let Some(split) = tree.nodes()[index].split else {
        return;
    };
    let (left_mask, right_mask) = mask.split_pool(params.dataset, split.attribute, split.threshold);
    let (left, right) = tree.expand(index);
    for (child, child_mask) in [(left, left_mask), (right, right_mask)] {
        match params.leaf_reason(&child_mask) {
            Some(reason) => tree.mark_leaf(child, reason),
            None => frontier.push((child, child_mask)),
        }
    }
}

fn best_first<M: Estimator>(params: &TreeBuildingParams<'_, M>, rng: &mut StdRng) -> Result<Tree> {
    let mut tree = Tree::new(params.dataset.n_attributes(), params.propositionalisation);
    let Some(root_mask) = init_root(&mut tree, params, rng)? else {
        return Ok(tree);
    };

    let mut frontier: Vec<(usize, ActiveMask)> = Vec::new();
    push_children(&mut tree, 0, &root_mask, params, &mut frontier);

    let mut round = 0usize;
    while !frontier.is_empty() && tree.node_count() < params.max_node_count {
        round += 1;
        // Every entry is re-scored each round: the tree changed since the
        // last round, so previous errors are stale.
        let mut scored: Vec<Option<(SplitCandidate, f64)>> = Vec::with_capacity(frontier.len());
        for (index, mask) in &frontier {
            scored.push(select_best_split(&mut tree, *index, mask, params, rng)?);
        }

        let mut winner: Option<(usize, SplitCandidate, f64)> = None;
        for (pos, outcome) in scored.iter().enumerate() {
            if let Some((candidate, error)) = *outcome {
                if winner.is_none_or(|(_, _, lowest)| error < lowest) {
                    winner = Some((pos, candidate, error));
                }
            }
        }
        debug!(round, frontier = frontier.len(), winner = ?winner.map(|(pos, _, e)| (frontier[pos].0, e)), "best-first round");

        let mut remaining = Vec::with_capacity(frontier.len());
        let mut chosen: Option<(usize, ActiveMask, SplitCandidate, f64)> = None;
        for (pos, ((index, mask), outcome)) in frontier.drain(..).zip(scored).enumerate() {
            match (winner, outcome) {
                (Some((w, candidate, error)), _) if w == pos => chosen = Some((index, mask, candidate, error)),
                (_, Some(_)) => remaining.push((index, mask)),
                (_, None) => tree.mark_leaf(index, LeafReason::NoCandidates),
            }
        }
        frontier = remaining;

        let Some((index, mask, candidate, error)) = chosen else {
            break;
        };
        tree.commit(index, candidate, error);
        push_children(&mut tree, index, &mask, params, &mut frontier);
    }

    for (index, _) in frontier {
        tree.mark_leaf(index, LeafReason::BudgetExhausted);
    }
    Ok(tree)
}

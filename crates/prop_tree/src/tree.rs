use crate::bag::{ActiveMask, Bag, Dataset};
use crate::conf::CLASS_COLUMN;
use crate::error::{PropTreeError, Result};
use crate::node::Node;
use crate::propositionalisation::PropositionalisationStrategy;
use crate::split::SplitCandidate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// Split record to inspect build history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub node: usize,
    pub attribute: usize,
    pub threshold: f64,
    pub error: f64,
    pub slots: (usize, usize),
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeafReason {
    /// Fewer active instances than the configured minimum.
    BelowMinOccupancy(usize),
    /// The split strategy refused the node (e.g. a pure region).
    NotExpandable,
    /// The split strategy produced no candidate threshold.
    NoCandidates,
    BudgetExhausted,
}

/// Binary partition tree over the instance space of a bag.
///
/// Nodes live in an arena with the root at index 0. The k-th committed split
/// owns regions `2k + 1` (left) and `2k + 2` (right); region 0 is the whole
/// bag. Each region occupies `features_per_region` consecutive features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
    node_count: usize,
    n_attributes: usize,
    propositionalisation: PropositionalisationStrategy,
    #[serde(skip)]
    tentative: Option<usize>,
    split_history: Vec<SplitRecord>,
    leaf_reasons: HashMap<usize, LeafReason>,
}

impl Tree {
    /// A tree made of a single unsplit root.
    pub fn new(n_attributes: usize, propositionalisation: PropositionalisationStrategy) -> Self {
        Self {
            nodes: vec![Node::leaf(0)],
            node_count: 0,
            n_attributes,
            propositionalisation,
            tentative: None,
            split_history: Vec::new(),
            leaf_reasons: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Number of committed split nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    pub fn propositionalisation(&self) -> PropositionalisationStrategy {
        self.propositionalisation
    }

    pub fn split_history(&self) -> &[SplitRecord] {
        &self.split_history
    }

    pub fn leaf_reasons(&self) -> &HashMap<usize, LeafReason> {
        &self.leaf_reasons
    }

    pub fn features_per_region(&self) -> usize {
        self.propositionalisation.features_per_region(self.n_attributes)
    }

    /// Regions in the current layout, counting a split under evaluation.
    pub fn num_regions(&self) -> usize {
        2 * (self.node_count + usize::from(self.tentative.is_some())) + 1
    }

    /// Length of a propositionalized vector, label included.
    pub fn width(&self) -> usize {
        self.num_regions() * self.features_per_region() + 1
    }

    /// Column names of the propositionalized table, `class` last.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self
            .propositionalisation
            .attribute_names_for(self.num_regions(), self.n_attributes);
        names.push(CLASS_COLUMN.to_string());
        names
    }

    /// Feature offsets of the regions owned by the `k`-th committed split.
    fn slots_for(&self, k: usize) -> (usize, usize) {
        let fpr = self.features_per_region();
        ((2 * k + 1) * fpr, (2 * k + 2) * fpr)
    }

    /// Place `candidate` on `index` as the next split in slot order without
    /// committing it. Any previous tentative split is discarded first.
    pub(crate) fn set_tentative(&mut self, index: usize, candidate: SplitCandidate) {
        self.clear_tentative();
        let slots = self.slots_for(self.node_count);
        let node = &mut self.nodes[index];
        node.split = Some(candidate);
        node.slots = Some(slots);
        self.tentative = Some(index);
    }

    pub(crate) fn clear_tentative(&mut self) {
        if let Some(index) = self.tentative.take() {
            self.nodes[index].clear();
        }
    }

    /// Permanently split `index` and give it the next pair of slots.
    pub fn commit(&mut self, index: usize, candidate: SplitCandidate, error: f64) {
        self.clear_tentative();
        let slots = self.slots_for(self.node_count);
        let node = &mut self.nodes[index];
        node.split = Some(candidate);
        node.slots = Some(slots);
        node.error = Some(error);
        let depth = node.depth;
        self.node_count += 1;
        self.leaf_reasons.remove(&index);

        debug!(
            node = index,
            attribute = candidate.attribute,
            threshold = candidate.threshold,
            error,
            left_slot = slots.0,
            right_slot = slots.1,
            "committed split"
        );
        self.split_history.push(SplitRecord {
            node: index,
            attribute: candidate.attribute,
            threshold: candidate.threshold,
            error,
            slots,
            depth,
        });
    }

    /// Attach two fresh leaves under a committed node.
    pub fn expand(&mut self, index: usize) -> (usize, usize) {
        let depth = self.nodes[index].depth + 1;
        let left = self.nodes.len();
        self.nodes.push(Node::leaf(depth));
        let right = self.nodes.len();
        self.nodes.push(Node::leaf(depth));
        self.nodes[index].children = Some((left, right));
        (left, right)
    }

    pub fn mark_leaf(&mut self, index: usize, reason: LeafReason) {
        self.leaf_reasons.insert(index, reason);
    }

    /// Fixed-length feature vector of `bag`: the whole-bag region, then the
    /// left and right regions of every split reached, then the bag label.
    pub fn propositionalize_bag(&self, bag: &Bag) -> Result<Vec<f64>> {
        self.bag_row(bag, 0)
    }

    /// `bag_index` is only used to name the offending bag in errors.
    fn bag_row(&self, bag: &Bag, bag_index: usize) -> Result<Vec<f64>> {
        if let Some(bad) = bag.instances.iter().find(|i| i.len() != self.n_attributes) {
            return Err(PropTreeError::Dimension {
                expected: self.n_attributes,
                actual: bad.len(),
                bag: bag_index,
            });
        }

        let mut out = vec![0.0; self.width()];
        let mask = ActiveMask::all_active(bag.len());
        self.propositionalisation
            .propositionalize(&bag.instances, self.n_attributes, &mask, &mut out, 0);
        if let Some(last) = out.last_mut() {
            *last = f64::from(bag.label.unwrap_or(0));
        }
        if self.root().is_branch() {
            self.descend(0, bag, &mask, &mut out);
        }
        Ok(out)
    }

    fn descend(&self, index: usize, bag: &Bag, mask: &ActiveMask, out: &mut [f64]) {
        let node = &self.nodes[index];
        let (Some(split), Some((left_slot, right_slot))) = (node.split, node.slots) else {
            return;
        };

        let (left, right) =
            mask.partition(|i| bag.instances[i][split.attribute] <= split.threshold);
        self.propositionalisation
            .propositionalize(&bag.instances, self.n_attributes, &left, out, left_slot);
        self.propositionalisation
            .propositionalize(&bag.instances, self.n_attributes, &right, out, right_slot);

        if let Some((l, r)) = node.children {
            if self.nodes[l].is_branch() {
                self.descend(l, bag, &left, out);
            }
            if self.nodes[r].is_branch() {
                self.descend(r, bag, &right, out);
            }
        }
    }

    /// Propositionalize every bag into one row of a table whose last column
    /// is `class`. Returns the table, the labels and the table's schema.
    pub fn propositionalize_dataset(&self, dataset: &Dataset) -> Result<(DataFrame, Vec<u32>, Schema)> {
        let names = self.feature_names();
        let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(dataset.n_bags()); names.len()];
        for (b, bag) in dataset.bags().iter().enumerate() {
            let row = self.bag_row(bag, b)?;
            for (column, v) in values.iter_mut().zip(row) {
                column.push(v);
            }
        }

        let columns: Vec<Column> = names
            .into_iter()
            .zip(values)
            .map(|(name, column)| Column::new(name.into(), column))
            .collect();
        let table = DataFrame::new(columns)?;
        let schema = table.schema().as_ref().clone();
        Ok((table, dataset.labels(), schema))
    }

    pub fn tree_info(&self) -> String {
        let mut info = String::new();

        info.push_str("=== Tree Information ===\n");
        info.push_str(&format!("Propositionalisation: {}\n", self.propositionalisation));
        info.push_str(&format!("Committed nodes: {}\n", self.node_count));
        info.push_str(&format!("Regions: {}\n", self.num_regions()));
        info.push_str(&format!("Features per region: {}\n", self.features_per_region()));
        let max_depth = self.nodes.iter().map(|node| node.depth).max().unwrap_or(0);
        info.push_str(&format!("Maximum depth: {}\n", max_depth));

        info.push_str("\nStructure:\n");
        self.write_node(0, &mut info);

        if !self.leaf_reasons.is_empty() {
            let mut reasons: Vec<_> = self.leaf_reasons.iter().collect();
            reasons.sort_by_key(|(index, _)| **index);
            info.push_str("\nLeaf stopping criteria:\n");
            for (index, reason) in reasons {
                info.push_str(&format!("  node {}: {:?}\n", index, reason));
            }
        }

        info.push_str("========================\n");
        info
    }

    fn write_node(&self, index: usize, info: &mut String) {
        let node = &self.nodes[index];
        let indent = "  ".repeat(node.depth + 1);
        match (node.split, node.slots) {
            (Some(split), Some((l, r))) => {
                info.push_str(&format!(
                    "{indent}[{index}] {split} (error {:.4}, slots {l}/{r})\n",
                    node.error.unwrap_or(f64::NAN)
                ));
                if let Some((left, right)) = node.children {
                    self.write_node(left, info);
                    self.write_node(right, info);
                }
            }
            _ => info.push_str(&format!("{indent}[{index}] leaf\n")),
        }
    }
}

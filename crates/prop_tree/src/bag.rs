//! Bags, datasets and the active-instance masks that track which instances
//! are still reachable at a tree node.

use crate::error::{PropTreeError, Result};
use serde::{Deserialize, Serialize};

/// One raw record: a value per raw attribute.
pub type Instance = Vec<f64>;

/// A labelled group of instances. `label` is the binary class (0 or 1);
/// `None` marks a bag whose label is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bag {
    pub instances: Vec<Instance>,
    pub label: Option<u32>,
}

impl Bag {
    pub fn new(instances: Vec<Instance>, label: Option<u32>) -> Self {
        Self { instances, label }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// A collection of bags whose instances all share `n_attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    bags: Vec<Bag>,
    n_attributes: usize,
    /// `offsets[b]` is the pool index of the first instance of bag `b`.
    offsets: Vec<usize>,
}

impl Dataset {
    /// Build a dataset, taking the dimensionality from the first instance found.
    pub fn new(bags: Vec<Bag>) -> Result<Self> {
        let n_attributes = bags
            .iter()
            .flat_map(|b| b.instances.first())
            .map(|i| i.len())
            .next()
            .unwrap_or(0);
        Self::with_attributes(bags, n_attributes)
    }

    pub fn with_attributes(bags: Vec<Bag>, n_attributes: usize) -> Result<Self> {
        let mut offsets = Vec::with_capacity(bags.len());
        let mut total = 0usize;
        for (b, bag) in bags.iter().enumerate() {
            if let Some(bad) = bag.instances.iter().find(|i| i.len() != n_attributes) {
                return Err(PropTreeError::Dimension {
                    expected: n_attributes,
                    actual: bad.len(),
                    bag: b,
                });
            }
            if let Some(label) = bag.label {
                if label > 1 {
                    return Err(PropTreeError::InvalidParameter {
                        name: format!("bag[{b}].label"),
                        value: label.to_string(),
                        reason: "labels must be 0 or 1".to_string(),
                    });
                }
            }
            offsets.push(total);
            total += bag.len();
        }
        Ok(Self {
            bags,
            n_attributes,
            offsets,
        })
    }

    /// Copy of this dataset without the bags whose label is missing.
    pub fn labelled(&self) -> Result<Self> {
        let bags = self
            .bags
            .iter()
            .filter(|b| b.label.is_some())
            .cloned()
            .collect();
        Self::with_attributes(bags, self.n_attributes)
    }

    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    pub fn n_bags(&self) -> usize {
        self.bags.len()
    }

    pub fn n_attributes(&self) -> usize {
        self.n_attributes
    }

    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    /// Number of instances across all bags.
    pub fn n_instances(&self) -> usize {
        self.offsets
            .last()
            .zip(self.bags.last())
            .map(|(o, b)| o + b.len())
            .unwrap_or(0)
    }

    /// Labels of all bags; missing labels read as class 0.
    pub fn labels(&self) -> Vec<u32> {
        self.bags.iter().map(|b| b.label.unwrap_or(0)).collect()
    }

    /// Iterate the instance pool in bag-major order as
    /// `(pool index, bag index, instance)`.
    pub fn pool(&self) -> impl Iterator<Item = (usize, usize, &Instance)> + '_ {
        self.bags
            .iter()
            .zip(self.offsets.iter())
            .enumerate()
            .flat_map(|(b, (bag, &offset))| {
                bag.instances
                    .iter()
                    .enumerate()
                    .map(move |(i, inst)| (offset + i, b, inst))
            })
    }

    /// Pool instances still reachable under `mask`, with their bag label.
    pub fn active<'a>(
        &'a self,
        mask: &'a ActiveMask,
    ) -> impl Iterator<Item = (&'a Instance, Option<u32>)> + 'a {
        self.pool()
            .filter(move |(idx, _, _)| mask.is_active(*idx))
            .map(move |(_, b, inst)| (inst, self.bags[b].label))
    }
}

/// Which instances of an enumeration are still reachable.
///
/// Entry `i` is `false` while instance `i` is active and `true` once it has
/// been routed elsewhere. Masks only become more restrictive with depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMask(Vec<bool>);

impl ActiveMask {
    /// Every instance active.
    pub fn all_active(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_active(&self, idx: usize) -> bool {
        !self.0[idx]
    }

    pub fn ignore(&mut self, idx: usize) {
        self.0[idx] = true;
    }

    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|ignored| !**ignored).count()
    }

    /// Route active instances: `goes_left(i)` true sends instance `i` left,
    /// false sends it right. Already ignored instances stay ignored on both
    /// sides. Both returned masks are independent copies.
    pub fn partition<F>(&self, mut goes_left: F) -> (ActiveMask, ActiveMask)
    where
        F: FnMut(usize) -> bool,
    {
        let mut left = self.clone();
        let mut right = self.clone();
        for idx in 0..self.len() {
            if !self.is_active(idx) {
                continue;
            }
            if goes_left(idx) {
                right.ignore(idx);
            } else {
                left.ignore(idx);
            }
        }
        (left, right)
    }

    /// Split the pool mask of `dataset` on `attribute <= threshold`.
    pub fn split_pool(
        &self,
        dataset: &Dataset,
        attribute: usize,
        threshold: f64,
    ) -> (ActiveMask, ActiveMask) {
        let values: Vec<f64> = dataset.pool().map(|(_, _, inst)| inst[attribute]).collect();
        self.partition(|idx| values[idx] <= threshold)
    }
}

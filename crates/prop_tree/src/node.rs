use crate::split::SplitCandidate;
use serde::{Deserialize, Serialize};

/// One node of the partition tree, stored in the tree's arena.
///
/// A node without a split is a leaf. A node with a split owns two feature
/// slots (offsets into the propositionalized vector) for the instances sent
/// left and right. `children` is only set once the node has been expanded;
/// a split node without children routes its instances into two implicit leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub split: Option<SplitCandidate>,
    pub children: Option<(usize, usize)>,
    pub depth: usize,
    pub slots: Option<(usize, usize)>,
    /// Training error reached when this node's split was chosen.
    pub error: Option<f64>,
}

impl Node {
    pub fn leaf(depth: usize) -> Self {
        Self {
            split: None,
            children: None,
            depth,
            slots: None,
            error: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }

    pub fn is_branch(&self) -> bool {
        self.split.is_some()
    }

    pub fn left_slot(&self) -> Option<usize> {
        self.slots.map(|(l, _)| l)
    }

    pub fn right_slot(&self) -> Option<usize> {
        self.slots.map(|(_, r)| r)
    }

    /// Drop any split information, turning the node back into a leaf.
    pub fn clear(&mut self) {
        self.split = None;
        self.slots = None;
        self.error = None;
    }
}

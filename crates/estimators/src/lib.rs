//! Contract between the propositionalization tree and the classifier it wraps.
//!
//! The tree treats the classifier as a black box: it only needs to fit a numeric
//! table, emit class probabilities, and cross-validate reproducibly.

pub mod api;
pub mod folds;

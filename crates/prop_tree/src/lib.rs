//! # Prop Tree
//!
//! Propositionalization of multi-instance data with a learned partition tree.
//!
//! A bag is a variable-length group of numeric instances sharing one binary
//! label. The tree splits the instance space (`attribute <= threshold` goes
//! left) and every region it creates contributes a fixed block of summary
//! features, so each bag becomes one fixed-length row. Splits are chosen by
//! training a wrapped [`Estimator`](estimator_api::api::Estimator) on the
//! candidate tables and keeping the lowest-error one.
//!
//! ## Example
//!
//! ```rust,ignore
//! use prop_tree::{Bag, Dataset, PropTreeClassifier, TreeConfig};
//! use prop_tree::models::GaussianNaiveBayes;
//!
//! let dataset = Dataset::new(bags)?;
//! let mut clf = PropTreeClassifier::new(TreeConfig::default(), GaussianNaiveBayes::default());
//! clf.fit(&dataset)?;
//! let p = clf.predict_proba(&dataset.bags()[0])?;
//! ```

// Module declarations
pub mod bag;
pub mod conf;
pub mod dataframe;
pub mod error;
pub mod estimator;
pub mod evaluation;
pub mod models;
pub mod node;
pub mod propositionalisation;
pub mod search;
pub mod serde;
pub mod split;
pub mod tree;

pub use bag::{ActiveMask, Bag, Dataset, Instance};
pub use conf::TreeConfig;
pub use error::{PropTreeError, Result};
pub use estimator::PropTreeClassifier;
pub use evaluation::EvaluationStrategy;
pub use propositionalisation::PropositionalisationStrategy;
pub use search::{SearchStrategy, TreeBuildingParams, build_tree};
pub use split::{SplitCandidate, SplitStrategy};
pub use tree::{LeafReason, SplitRecord, Tree};

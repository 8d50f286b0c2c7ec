use crate::bag::{Bag, Dataset};
use crate::conf::{CLASS_COLUMN, TreeConfig};
use crate::error::{PropTreeError, Result};
use crate::search::build_tree;
use crate::tree::Tree;
use estimator_api::api::{ClassProbabilities, Estimator};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Bag classifier: learns a partition tree, propositionalizes every bag with
/// it and trains the wrapped model `M` on the resulting table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropTreeClassifier<M> {
    pub config: TreeConfig,
    prototype: M,
    tree: Option<Tree>,
    model: Option<M>,
    #[serde(with = "crate::serde::schema")]
    schema: Option<Schema>,
}

impl<M: Estimator> PropTreeClassifier<M> {
    pub fn new(config: TreeConfig, prototype: M) -> Self {
        Self {
            config,
            prototype,
            tree: None,
            model: None,
            schema: None,
        }
    }

    pub fn from_options<'a, I>(options: I, prototype: M) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Ok(Self::new(TreeConfig::from_options(options)?, prototype))
    }

    pub fn is_fitted(&self) -> bool {
        self.tree.is_some() && self.model.is_some()
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Schema of the propositionalized training table, `class` included.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn tree_info(&self) -> Result<String> {
        Ok(self.tree.as_ref().ok_or(PropTreeError::NotFitted)?.tree_info())
    }

    /// Build the tree on the labelled bags of `dataset`, then fit the wrapped
    /// model on their propositionalized table. A failure leaves `self` unchanged.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        let labelled = dataset.labelled()?;
        if labelled.is_empty() {
            return Err(PropTreeError::EmptyDataset);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let tree = build_tree(&labelled, &self.config, &self.prototype, &mut rng)?;
        let (table, labels, schema) = tree.propositionalize_dataset(&labelled)?;
        let features = table.drop(CLASS_COLUMN)?;

        let mut model = self.prototype.clone();
        model.fit(&features, &labels)?;
        info!(
            bags = labelled.n_bags(),
            dropped = dataset.n_bags() - labelled.n_bags(),
            columns = schema.len(),
            "fitted wrapped model on propositionalized bags"
        );

        self.tree = Some(tree);
        self.model = Some(model);
        self.schema = Some(schema);
        Ok(())
    }

    /// Feature vector of `bag` under the fitted tree, label last.
    pub fn propositionalize(&self, bag: &Bag) -> Result<Vec<f64>> {
        let tree = self.tree.as_ref().ok_or(PropTreeError::NotFitted)?;
        let schema = self.schema.as_ref().ok_or(PropTreeError::NotFitted)?;
        let row = tree.propositionalize_bag(bag)?;
        if row.len() != schema.len() {
            return Err(PropTreeError::Data(format!(
                "bag propositionalized to {} values but the training schema has {} columns",
                row.len(),
                schema.len()
            )));
        }
        Ok(row)
    }

    pub fn predict_proba(&self, bag: &Bag) -> Result<ClassProbabilities> {
        let model = self.model.as_ref().ok_or(PropTreeError::NotFitted)?;
        let schema = self.schema.as_ref().ok_or(PropTreeError::NotFitted)?;
        let row = self.propositionalize(bag)?;

        let columns: Vec<Column> = schema
            .iter_names()
            .zip(row)
            .filter(|(name, _)| name.as_str() != CLASS_COLUMN)
            .map(|(name, value)| Column::new(name.clone(), vec![value]))
            .collect();
        let frame = DataFrame::new(columns)?;

        model
            .predict_proba(&frame)?
            .into_iter()
            .next()
            .ok_or_else(|| PropTreeError::Data("wrapped model returned no prediction".to_string()))
    }

    /// Most probable class of `bag`; ties go to class 0.
    pub fn predict(&self, bag: &Bag) -> Result<u32> {
        let p = self.predict_proba(bag)?;
        Ok(u32::from(p[1] > p[0]))
    }
}

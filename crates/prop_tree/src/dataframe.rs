use crate::bag::{Bag, Dataset, Instance};
use crate::error::{PropTreeError, Result};
use polars::prelude::*;
use std::collections::HashMap;

impl Dataset {
    /// Group a long-format table (one row per instance) into bags.
    ///
    /// Rows sharing a value in `bag_column` form one bag; bags keep the order in
    /// which their id first appears. The label of a bag is read from its first
    /// row. Every other column is a raw attribute and is cast to `f64`.
    pub fn from_long_dataframe(df: &DataFrame, bag_column: &str, label_column: &str) -> Result<Self> {
        let ids = df.column(bag_column)?.cast(&DataType::String)?;
        let ids = ids.str()?;
        let labels = df.column(label_column)?.cast(&DataType::UInt32)?;
        let labels = labels.u32()?;

        let attribute_names: Vec<PlSmallStr> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != bag_column && name.as_str() != label_column)
            .cloned()
            .collect();

        let mut attributes: Vec<Vec<f64>> = Vec::with_capacity(attribute_names.len());
        for name in &attribute_names {
            let casted = df.column(name.as_str())?.cast(&DataType::Float64)?;
            let ca = casted.f64()?;
            if ca.null_count() > 0 {
                return Err(PropTreeError::Data(format!(
                    "attribute column '{name}' contains {} missing values",
                    ca.null_count()
                )));
            }
            attributes.push(ca.into_no_null_iter().collect());
        }

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut bags: Vec<Bag> = Vec::new();
        for (row, (id, label)) in ids.into_iter().zip(labels.into_iter()).enumerate() {
            let id = id.ok_or_else(|| {
                PropTreeError::Data(format!("row {row} has no value in '{bag_column}'"))
            })?;
            let instance: Instance = attributes.iter().map(|col| col[row]).collect();
            match positions.get(id) {
                Some(&pos) => bags[pos].instances.push(instance),
                None => {
                    positions.insert(id.to_string(), bags.len());
                    bags.push(Bag::new(vec![instance], label));
                }
            }
        }

        Dataset::with_attributes(bags, attribute_names.len())
    }
}

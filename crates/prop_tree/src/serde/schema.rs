//! `Option<Schema>` as a list of `(column, dtype)` pairs.
//!
//! Propositionalized tables only hold numeric columns, so only the primitive
//! numeric dtypes are accepted back.

use polars::prelude::*;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn dtype_name(dtype: &DataType) -> Option<&'static str> {
    Some(match dtype {
        DataType::Float64 => "f64",
        DataType::Float32 => "f32",
        DataType::Int64 => "i64",
        DataType::Int32 => "i32",
        DataType::UInt64 => "u64",
        DataType::UInt32 => "u32",
        DataType::Boolean => "bool",
        _ => return None,
    })
}

fn parse_dtype(name: &str) -> Option<DataType> {
    Some(match name {
        "f64" => DataType::Float64,
        "f32" => DataType::Float32,
        "i64" => DataType::Int64,
        "i32" => DataType::Int32,
        "u64" => DataType::UInt64,
        "u32" => DataType::UInt32,
        "bool" => DataType::Boolean,
        _ => return None,
    })
}

pub fn serialize<S>(schema: &Option<Schema>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let pairs = match schema {
        Some(s) => {
            let mut pairs: Vec<(String, &'static str)> = Vec::with_capacity(s.len());
            for (name, dtype) in s.iter() {
                let dtype = dtype_name(dtype).ok_or_else(|| {
                    serde::ser::Error::custom(format!("column '{name}' has unsupported dtype {dtype:?}"))
                })?;
                pairs.push((name.to_string(), dtype));
            }
            Some(pairs)
        }
        None => None,
    };
    pairs.serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Schema>, D::Error>
where
    D: Deserializer<'de>,
{
    let pairs: Option<Vec<(String, String)>> = Option::deserialize(deserializer)?;
    let Some(pairs) = pairs else {
        return Ok(None);
    };
    let mut schema = Schema::default();
    for (name, dtype) in pairs {
        let parsed = parse_dtype(&dtype)
            .ok_or_else(|| D::Error::custom(format!("unknown dtype '{dtype}' for column '{name}'")))?;
        schema.insert(PlSmallStr::from_string(name), parsed);
    }
    Ok(Some(schema))
}

use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Holder {
    #[serde(with = "prop_tree::serde::schema")]
    schema: Option<Schema>,
}

#[test]
fn test_numeric_schema_survives_json() {
    let mut schema = Schema::default();
    schema.insert(PlSmallStr::from_str("region_0_count"), DataType::Float64);
    schema.insert(PlSmallStr::from_str("class"), DataType::Float64);

    let json = serde_json::to_string(&Holder { schema: Some(schema.clone()) }).unwrap();
    assert!(json.contains("region_0_count"));
    let back: Holder = serde_json::from_str(&json).unwrap();
    assert_eq!(back.schema, Some(schema));
}

#[test]
fn test_missing_schema_stays_missing() {
    let back: Holder = serde_json::from_str(r#"{"schema":null}"#).unwrap();
    assert!(back.schema.is_none());
}

#[test]
fn test_unknown_dtype_is_rejected() {
    let json = r#"{"schema":[["a","decimal"]]}"#;
    assert!(serde_json::from_str::<Holder>(json).is_err());
}

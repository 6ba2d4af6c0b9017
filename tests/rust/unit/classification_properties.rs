//! Entity/flow classification contract.

use schemascope::provider::models::Row;
use schemascope::schema_catalog::{classify_rows, TableShape};
use serde_json::{json, Value};

fn rows(value: Value) -> Vec<Row> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
}

#[test]
fn source_and_destination_mean_flow() {
    let sample = rows(json!([{"source_id": 1, "destination_id": 2}]));
    assert_eq!(classify_rows(&sample), TableShape::Flow);
}

#[test]
fn plain_records_mean_entity() {
    let sample = rows(json!([{"id": 1, "name": "x"}]));
    assert_eq!(classify_rows(&sample), TableShape::Entity);
}

#[test]
fn empty_sample_defaults_to_entity() {
    assert_eq!(classify_rows(&[]), TableShape::Entity);
}

#[test]
fn join_tables_with_two_id_columns_stay_entity() {
    // the historical two-_id fallback never produced anything but
    // entity; the shape must keep classifying that way
    let sample = rows(json!([{"user_id": 1, "group_id": 2}]));
    assert_eq!(classify_rows(&sample), TableShape::Entity);
}

#[test]
fn one_endpoint_field_alone_is_not_a_flow() {
    let sample = rows(json!([{"source_id": 1, "kind": "export"}]));
    assert_eq!(classify_rows(&sample), TableShape::Entity);
}

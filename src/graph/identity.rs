//! Deterministic composite identifiers
//!
//! Every node and edge id is derived from its semantic path, never from
//! a counter or random source. Re-deriving the id from the same inputs
//! must always collide, which is what makes repeated expansion an
//! idempotent merge instead of a duplication bug.
//!
//! Forms:
//! - table / external table: `orders`
//! - column: `orders.customer_id`
//! - record value: `orders:customer_id:42`
//! - flow endpoint: the raw endpoint id
//! - edge: `<source>-[<kind>]-><target>`, except flow edges which are
//!   keyed by their flow identifier (`flow:<dataflow_id>`)

use serde_json::Value;

use super::elements::EdgeKind;

/// Canonical string form of a scalar cell value for use inside ids.
pub fn scalar_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

pub fn table_node_id(table: &str) -> String {
    table.to_string()
}

pub fn column_node_id(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

pub fn record_node_id(table: &str, column: &str, value: &Value) -> String {
    format!("{}:{}:{}", table, column, scalar_key(value))
}

pub fn flow_node_id(endpoint: &Value) -> String {
    scalar_key(endpoint)
}

pub fn edge_id(source: &str, target: &str, kind: EdgeKind) -> String {
    format!("{}-[{}]->{}", source, kind.as_str(), target)
}

pub fn flow_edge_id(dataflow: &Value) -> String {
    format!("flow:{}", scalar_key(dataflow))
}
